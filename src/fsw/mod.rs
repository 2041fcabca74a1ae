/*!
 * Formal SignWriting (FSW) notation.
 *
 * This module contains the data model and algorithms for FSW tokens:
 *
 * - `parse`: Parsing of signs and symbols into typed values
 * - `metrics`: Symbol size lookups used for layout and normalization
 * - `normalize`: Canonicalization of signs (box recomputation and centering)
 */

use std::fmt;

pub use self::metrics::SymbolMetrics;
pub use self::normalize::{normalize_sign, normalize_token};
pub use self::parse::parse_token;

pub mod metrics;
pub mod normalize;
pub mod parse;

/// Lowest valid coordinate on the FSW plane
pub const COORD_MIN: i32 = 250;

/// Highest valid coordinate on the FSW plane
pub const COORD_MAX: i32 = 749;

/// Centre of the FSW plane
pub const COORD_CENTER: i32 = 500;

/// A symbol key such as `S15a04`: base symbol, fill and rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolKey {
    /// Base symbol, 0x100..=0x38b
    pub base: u16,
    /// Fill modifier, 0..=5
    pub fill: u8,
    /// Rotation modifier, 0..=15
    pub rotation: u8,
}

impl SymbolKey {
    /// Hand shapes
    pub fn is_hand(&self) -> bool {
        (0x100..=0x204).contains(&self.base)
    }

    /// Symbols that anchor horizontal centering (heads)
    pub fn is_hcenter(&self) -> bool {
        (0x2ff..=0x36c).contains(&self.base)
    }

    /// Symbols that anchor vertical centering (heads and trunk)
    pub fn is_vcenter(&self) -> bool {
        (0x2ff..=0x375).contains(&self.base)
    }

    /// Key of the base symbol without modifiers, e.g. `S15a`
    pub fn base_key(&self) -> String {
        format!("S{:03x}", self.base)
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:03x}{:x}{:x}", self.base, self.fill, self.rotation)
    }
}

/// A point on the FSW plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the point lies on the writable plane
    pub fn in_range(&self) -> bool {
        (COORD_MIN..=COORD_MAX).contains(&self.x) && (COORD_MIN..=COORD_MAX).contains(&self.y)
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}x{:03}", self.x, self.y)
    }
}

/// A symbol placed at a coordinate inside a sign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spatial {
    pub symbol: SymbolKey,
    pub coord: Coord,
}

impl fmt::Display for Spatial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.symbol, self.coord)
    }
}

/// Lane marker of a sign box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxMarker {
    /// Unlaned sign box
    B,
    /// Left lane
    L,
    /// Middle lane
    M,
    /// Right lane
    R,
}

impl BoxMarker {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(Self::B),
            'L' => Some(Self::L),
            'M' => Some(Self::M),
            'R' => Some(Self::R),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::B => 'B',
            Self::L => 'L',
            Self::M => 'M',
            Self::R => 'R',
        }
    }
}

/// A complete sign: optional temporal prefix, box and placed symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sign {
    /// Temporal prefix (`A...`), may be empty
    pub sequence: Vec<SymbolKey>,
    pub marker: BoxMarker,
    /// Bottom-right corner of the sign box
    pub max: Coord,
    pub spatials: Vec<Spatial>,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.sequence.is_empty() {
            write!(f, "A")?;
            for key in &self.sequence {
                write!(f, "{}", key)?;
            }
        }
        write!(f, "{}{}", self.marker.as_char(), self.max)?;
        for spatial in &self.spatials {
            write!(f, "{}", spatial)?;
        }
        Ok(())
    }
}

/// Any FSW token accepted by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FswToken {
    /// A full sign
    Sign(Sign),
    /// A lone symbol, optionally positioned
    Symbol { key: SymbolKey, coord: Option<Coord> },
}

impl fmt::Display for FswToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sign(sign) => write!(f, "{}", sign),
            Self::Symbol { key, coord: Some(coord) } => write!(f, "{}{}", key, coord),
            Self::Symbol { key, coord: None } => write!(f, "{}", key),
        }
    }
}
