/*!
 * Export rasterizer.
 *
 * Turns a snapshot of the glyph tree into a PNG and hands it to a sink. The
 * sequence is fixed: re-confirm fonts, let the glyphs settle, rasterize at the
 * supersampling scale over the theme background, encode, deliver. Only one
 * export runs at a time per rasterizer; a second request while one is in
 * flight is rejected.
 *
 * When the glyph renderer has no readiness signal the settle step is a plain
 * bounded sleep, which can still race a renderer that is slower than the delay.
 *
 * Canvas edges are capped at `MAX_EDGE` (16 384 px). At the default glyph size
 * and scale that limits a column export to roughly 160 signs; longer sequences
 * fail with `RenderError::CanvasSize` rather than allocating.
 */

use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage, imageops};
use log::{debug, error, info};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::app_config::{Config, Direction, Theme};
use crate::display::font_gate::FontGate;
use crate::display::renderer::GlyphTree;
use crate::errors::{ExportFailed, RenderError};
use crate::file_utils::FileManager;

use super::glyph::{GlyphRenderer, MAX_EDGE};
use super::sink::ArtifactSink;
use super::{ExportArtifact, PNG_MIME};

/// Spacing between signs and around the container, in unscaled pixels
pub const SIGN_SPACING: u32 = 16;

/// Layout and appearance of a raster export
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub scale: u32,
    pub padding: u32,
    pub gap: u32,
    pub background: [u8; 4],
}

impl RasterOptions {
    pub fn new(scale: u32, theme: Theme) -> Self {
        Self {
            scale: scale.max(1),
            padding: SIGN_SPACING,
            gap: SIGN_SPACING,
            background: theme.background(),
        }
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self::new(2, Theme::Light)
    }
}

/// Composite every element of a tree onto one canvas
pub fn rasterize(
    tree: &GlyphTree,
    renderer: &dyn GlyphRenderer,
    options: &RasterOptions,
) -> Result<RgbaImage, ExportFailed> {
    let GlyphTree::Signs {
        direction,
        style,
        elements,
    } = tree
    else {
        return Err(ExportFailed::NothingToExport);
    };

    let tiles = elements
        .iter()
        .map(|element| renderer.mount(&element.fsw, style, options.scale))
        .collect::<Result<Vec<_>, RenderError>>()?;

    let dims: Vec<(u32, u32)> = tiles.iter().map(|t| (t.width(), t.height())).collect();
    let (width, height) = canvas_size(*direction, &dims, options)?;
    let padding = options.padding * options.scale;
    let gap = options.gap * options.scale;
    let (content_w, content_h) = (width - 2 * padding, height - 2 * padding);

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(options.background));
    let mut cursor = padding;
    for tile in &tiles {
        let (x, y) = match direction {
            Direction::Column => (padding + (content_w - tile.width()) / 2, cursor),
            Direction::Row => (cursor, padding + (content_h - tile.height()) / 2),
        };
        imageops::overlay(&mut canvas, &tile.image, x as i64, y as i64);
        cursor += gap
            + match direction {
                Direction::Column => tile.height(),
                Direction::Row => tile.width(),
            };
    }

    Ok(canvas)
}

/// Canvas size for tiles of the given dimensions laid out in `direction`.
///
/// Every step is checked, so a sequence too long for one canvas is reported
/// as `CanvasSize` before anything is allocated.
pub fn canvas_size(
    direction: Direction,
    dims: &[(u32, u32)],
    options: &RasterOptions,
) -> Result<(u32, u32), RenderError> {
    let too_large = || RenderError::CanvasSize {
        width: u32::MAX,
        height: u32::MAX,
    };
    let scaled = |value: u32| value.checked_mul(options.scale).ok_or_else(too_large);
    let padding = scaled(options.padding)?;
    let gap = scaled(options.gap)?;

    let count = u32::try_from(dims.len()).map_err(|_| too_large())?;
    let gaps = gap
        .checked_mul(count.saturating_sub(1))
        .ok_or_else(too_large)?;
    let widest = |pick: fn(&(u32, u32)) -> u32| dims.iter().map(pick).max().unwrap_or(0);
    let stacked = |pick: fn(&(u32, u32)) -> u32| {
        dims.iter()
            .try_fold(gaps, |acc, d| acc.checked_add(pick(d)))
            .ok_or_else(too_large)
    };
    let (content_w, content_h) = match direction {
        Direction::Column => (widest(tile_width), stacked(tile_height)?),
        Direction::Row => (stacked(tile_width)?, widest(tile_height)),
    };

    let border = padding.checked_mul(2).ok_or_else(too_large)?;
    let width = content_w.checked_add(border).ok_or_else(too_large)?;
    let height = content_h.checked_add(border).ok_or_else(too_large)?;
    if width > MAX_EDGE || height > MAX_EDGE {
        return Err(RenderError::CanvasSize { width, height });
    }
    Ok((width, height))
}

fn tile_width(dims: &(u32, u32)) -> u32 {
    dims.0
}

fn tile_height(dims: &(u32, u32)) -> u32 {
    dims.1
}

/// Encode a canvas as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Bytes, ExportFailed> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ExportFailed::Encode(e.to_string()))?;
    Ok(Bytes::from(buffer.into_inner()))
}

/// Clears the exporting flag however the export ends
struct ExportingFlag<'a>(&'a AtomicBool);

impl<'a> ExportingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for ExportingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Single-flight image exporter for one display
#[derive(Debug)]
pub struct ExportRasterizer {
    gate: Arc<FontGate>,
    renderer: Arc<dyn GlyphRenderer>,
    sink: Arc<dyn ArtifactSink>,
    options: RasterOptions,
    settle_delay: Duration,
    product: String,
    in_flight: Mutex<()>,
    exporting: AtomicBool,
}

impl ExportRasterizer {
    pub fn new(
        gate: Arc<FontGate>,
        renderer: Arc<dyn GlyphRenderer>,
        sink: Arc<dyn ArtifactSink>,
        options: RasterOptions,
        settle_delay: Duration,
        product: &str,
    ) -> Self {
        Self {
            gate,
            renderer,
            sink,
            options,
            settle_delay,
            product: product.to_string(),
            in_flight: Mutex::new(()),
            exporting: AtomicBool::new(false),
        }
    }

    /// Build from the export and display sections of a configuration
    pub fn from_config(
        config: &Config,
        gate: Arc<FontGate>,
        renderer: Arc<dyn GlyphRenderer>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self::new(
            gate,
            renderer,
            sink,
            RasterOptions::new(config.export.scale, config.display.theme),
            Duration::from_millis(config.export.settle_delay_ms),
            &config.export.product_name,
        )
    }

    /// Whether an export is running
    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn sink(&self) -> Arc<dyn ArtifactSink> {
        Arc::clone(&self.sink)
    }

    /// Export a snapshot of the tree as a PNG and deliver it
    pub async fn export_image(&self, tree: GlyphTree) -> Result<ExportArtifact, ExportFailed> {
        let _permit = self
            .in_flight
            .try_lock()
            .map_err(|_| ExportFailed::AlreadyInProgress)?;
        let _flag = ExportingFlag::raise(&self.exporting);

        let result = self.run_export(tree).await;
        if let Err(e) = &result {
            error!("{}", e.user_notice());
        }
        result
    }

    async fn run_export(&self, tree: GlyphTree) -> Result<ExportArtifact, ExportFailed> {
        if tree.is_empty() {
            return Err(ExportFailed::NothingToExport);
        }
        let requested_at = chrono::Utc::now().timestamp_millis();

        if !self.gate.reconfirm().await {
            return Err(ExportFailed::FontsUnavailable);
        }

        match self.renderer.wait_until_stable().await {
            Some(()) => debug!("Glyph renderer reported stable"),
            None => {
                debug!("Waiting {:?} for glyphs to settle", self.settle_delay);
                tokio::time::sleep(self.settle_delay).await;
            }
        }

        let renderer = Arc::clone(&self.renderer);
        let options = self.options.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            let canvas = rasterize(&tree, renderer.as_ref(), &options)?;
            debug!("Rasterized {}x{} canvas", canvas.width(), canvas.height());
            encode_png(&canvas)
        })
        .await
        .map_err(|e| ExportFailed::Encode(e.to_string()))??;

        let artifact = ExportArtifact {
            file_name: FileManager::export_file_name(&self.product, requested_at, "png"),
            mime_type: PNG_MIME,
            bytes,
            created_at_ms: requested_at,
        };

        self.sink.deliver(&artifact).await?;
        info!("Exported {} as {}", artifact.mime_type, artifact.file_name);
        Ok(artifact)
    }
}
