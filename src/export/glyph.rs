/*!
 * Glyph renderer capability.
 *
 * A glyph renderer turns one canonical FSW string into a bitmap. The built-in
 * `OutlineGlyphRenderer` draws every symbol of a sign as its bounding box,
 * scaled from FSW units (30 units per 30px of glyph size) and filled when the
 * symbol carries a fill modifier. Tokens that do not parse render as an empty
 * tile so a single bad token never breaks the rest of an export.
 *
 * A renderer restricted to a set of font families refuses styles naming any
 * other family. Every bitmap, blank tiles included, is bounded by `MAX_EDGE`.
 */

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;

use crate::display::renderer::GlyphStyle;
use crate::errors::RenderError;
use crate::fsw::{Coord, FswToken, Spatial, SymbolMetrics, parse_token};

/// Glyph size at which one FSW unit maps to one pixel
pub const UNIT_GLYPH_SIZE: f32 = 30.0;

/// Largest bitmap edge a renderer will allocate
pub const MAX_EDGE: u32 = 16_384;

/// A mounted glyph, ready to be composited
#[derive(Debug, Clone)]
pub struct VisualHandle {
    pub fsw: String,
    pub image: RgbaImage,
}

impl VisualHandle {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Renders one sign identified by its canonical FSW string
#[async_trait]
pub trait GlyphRenderer: Send + Sync + Debug {
    /// Paint a sign at the given style and supersampling scale
    fn mount(&self, fsw: &str, style: &GlyphStyle, scale: u32) -> Result<VisualHandle, RenderError>;

    /// Wait until mounted glyphs have finished their own rendering.
    ///
    /// # Returns
    /// * `None` - the renderer has no readiness signal
    /// * `Some(())` - rendering is stable
    async fn wait_until_stable(&self) -> Option<()> {
        None
    }
}

/// Draws symbol bounding boxes from a metrics table
#[derive(Debug, Clone)]
pub struct OutlineGlyphRenderer {
    metrics: Arc<SymbolMetrics>,
    families: Vec<String>,
}

impl OutlineGlyphRenderer {
    /// A renderer that draws any font family
    pub fn new(metrics: Arc<SymbolMetrics>) -> Self {
        Self {
            metrics,
            families: Vec::new(),
        }
    }

    /// Only draw styles naming one of these font families
    pub fn with_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.families = families.into_iter().map(Into::into).collect();
        self
    }

    fn check_family(&self, fsw: &str, style: &GlyphStyle) -> Result<(), RenderError> {
        if self.families.is_empty() || self.families.contains(&style.font_family) {
            return Ok(());
        }
        Err(RenderError::Mount {
            token: fsw.to_string(),
            message: format!("font family '{}' is not loaded", style.font_family),
        })
    }

    fn symbol_size(&self, spatial: &Spatial) -> (u32, u32) {
        self.metrics
            .size(&spatial.symbol)
            .unwrap_or(crate::fsw::metrics::NOMINAL_SYMBOL_SIZE)
    }
}

#[async_trait]
impl GlyphRenderer for OutlineGlyphRenderer {
    fn mount(&self, fsw: &str, style: &GlyphStyle, scale: u32) -> Result<VisualHandle, RenderError> {
        self.check_family(fsw, style)?;
        let pixels_per_unit = style.size as f32 / UNIT_GLYPH_SIZE * scale.max(1) as f32;

        let spatials = match parse_token(fsw) {
            Ok(FswToken::Sign(sign)) => sign.spatials,
            Ok(FswToken::Symbol { key, coord }) => vec![Spatial {
                symbol: key,
                coord: coord.unwrap_or(Coord::new(500, 500)),
            }],
            Err(e) => {
                debug!("Rendering '{}' as a blank tile: {}", fsw, e);
                Vec::new()
            }
        };

        if spatials.is_empty() {
            let edge = style
                .size
                .checked_mul(scale.max(1))
                .filter(|edge| *edge <= MAX_EDGE)
                .ok_or_else(|| {
                    let edge = style.size.saturating_mul(scale.max(1));
                    RenderError::CanvasSize {
                        width: edge,
                        height: edge,
                    }
                })?
                .max(1);
            return Ok(VisualHandle {
                fsw: fsw.to_string(),
                image: RgbaImage::new(edge, edge),
            });
        }

        let boxes: Vec<(Spatial, (u32, u32))> =
            spatials.iter().map(|s| (*s, self.symbol_size(s))).collect();
        let x1 = boxes.iter().map(|(s, _)| s.coord.x).min().unwrap_or(500);
        let y1 = boxes.iter().map(|(s, _)| s.coord.y).min().unwrap_or(500);
        let x2 = boxes.iter().map(|(s, (w, _))| s.coord.x + *w as i32).max().unwrap_or(500);
        let y2 = boxes.iter().map(|(s, (_, h))| s.coord.y + *h as i32).max().unwrap_or(500);

        let to_px = |units: i32| (units as f32 * pixels_per_unit).round() as i64;
        let width = to_px(x2 - x1).max(1) as u32 + 1;
        let height = to_px(y2 - y1).max(1) as u32 + 1;
        if width > MAX_EDGE || height > MAX_EDGE {
            return Err(RenderError::CanvasSize { width, height });
        }

        let mut image = RgbaImage::new(width, height);
        let ink = Rgba(style.color);
        let stroke = scale.max(1) as i64;

        for (spatial, (w, h)) in &boxes {
            let left = to_px(spatial.coord.x - x1);
            let top = to_px(spatial.coord.y - y1);
            let right = to_px(spatial.coord.x - x1 + *w as i32);
            let bottom = to_px(spatial.coord.y - y1 + *h as i32);

            if spatial.symbol.fill > 0 {
                fill_rect(&mut image, left, top, right, bottom, ink);
            } else {
                stroke_rect(&mut image, left, top, right, bottom, stroke, ink);
            }
        }

        Ok(VisualHandle {
            fsw: fsw.to_string(),
            image,
        })
    }
}

fn fill_rect(image: &mut RgbaImage, left: i64, top: i64, right: i64, bottom: i64, color: Rgba<u8>) {
    let x_end = right.min(image.width() as i64);
    let y_end = bottom.min(image.height() as i64);
    for y in top.max(0)..y_end {
        for x in left.max(0)..x_end {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn stroke_rect(
    image: &mut RgbaImage,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
    stroke: i64,
    color: Rgba<u8>,
) {
    fill_rect(image, left, top, right, top + stroke, color);
    fill_rect(image, left, bottom - stroke, right, bottom, color);
    fill_rect(image, left, top, left + stroke, bottom, color);
    fill_rect(image, right - stroke, top, right, bottom, color);
}
