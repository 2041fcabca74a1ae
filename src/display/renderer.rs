/*!
 * Glyph tree rendering.
 *
 * A pure derivation from normalized tokens to an ordered list of glyph
 * elements. The tree is rebuilt wholesale on every token change; an element's
 * identity is its position.
 */

use std::time::Duration;

use crate::app_config::Direction;

/// Stagger between the entrance animations of consecutive signs
pub const ENTRANCE_STAGGER: Duration = Duration::from_millis(100);

/// Style inherited by every element of a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphStyle {
    /// Ink color as RGBA
    pub color: [u8; 4],
    /// Glyph size in pixels
    pub size: u32,
    /// Font family the glyphs are drawn with
    pub font_family: String,
}

impl Default for GlyphStyle {
    fn default() -> Self {
        Self {
            color: [0x00, 0x00, 0x00, 0xff],
            size: 48,
            font_family: "SuttonSignWritingLine".to_string(),
        }
    }
}

/// One rendered sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphElement {
    /// Position in the sequence, also the element's identity
    pub index: usize,
    /// Canonical (or fallback raw) FSW string
    pub fsw: String,
}

impl GlyphElement {
    /// Stable key of the element
    pub fn key(&self) -> String {
        format!("sign-{}", self.index)
    }

    /// Delay before the element starts its entrance animation
    pub fn entrance_delay(&self) -> Duration {
        ENTRANCE_STAGGER * self.index as u32
    }

    /// Hover label shown for the element
    pub fn label(&self) -> String {
        format!("Sign {}", self.index + 1)
    }
}

/// The rendered sequence of signs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphTree {
    /// Nothing to show; no container is rendered
    Empty,
    /// A container of signs laid out along a direction
    Signs {
        direction: Direction,
        style: GlyphStyle,
        elements: Vec<GlyphElement>,
    },
}

impl GlyphTree {
    pub fn len(&self) -> usize {
        self.elements().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn elements(&self) -> &[GlyphElement] {
        match self {
            Self::Empty => &[],
            Self::Signs { elements, .. } => elements,
        }
    }

    /// FSW strings of all elements, in order
    pub fn tokens(&self) -> Vec<String> {
        self.elements().iter().map(|e| e.fsw.clone()).collect()
    }
}

/// Build the glyph tree for a token sequence
pub fn render(tokens: &[String], direction: Direction, style: &GlyphStyle) -> GlyphTree {
    if tokens.is_empty() {
        return GlyphTree::Empty;
    }

    let elements = tokens
        .iter()
        .enumerate()
        .map(|(index, fsw)| GlyphElement {
            index,
            fsw: fsw.clone(),
        })
        .collect();

    GlyphTree::Signs {
        direction,
        style: style.clone(),
        elements,
    }
}
