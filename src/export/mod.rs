/*!
 * Exporting the rendered signs.
 *
 * - `glyph`: The glyph renderer capability and the built-in outline renderer
 * - `rasterizer`: Snapshotting a glyph tree into a PNG image
 * - `text`: The plain-text fallback export
 * - `sink`: Delivery of finished artifacts
 */

use bytes::Bytes;

pub use self::glyph::{GlyphRenderer, OutlineGlyphRenderer, VisualHandle};
pub use self::rasterizer::{ExportRasterizer, RasterOptions};
pub use self::sink::{ArtifactSink, DirectorySink, MemorySink};

pub mod glyph;
pub mod rasterizer;
pub mod sink;
pub mod text;

/// MIME type of image exports
pub const PNG_MIME: &str = "image/png";

/// MIME type of text exports
pub const TEXT_MIME: &str = "text/plain";

/// A finished export, detached from the display that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Bytes,
    /// Unix timestamp of the request, in milliseconds
    pub created_at_ms: i64,
}

impl ExportArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
