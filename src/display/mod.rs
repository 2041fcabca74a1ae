/*!
 * The SignWriting display.
 *
 * - `font_gate`: One-shot loading of the glyph fonts
 * - `normalizer`: Per-token canonicalization with fallback and staleness tracking
 * - `renderer`: Turning normalized tokens into an ordered glyph tree
 * - `controller`: The state machine tying fonts, tokens and exports together
 */

pub use self::controller::{DisplayController, DisplayState, NormalizeOutcome};
pub use self::font_gate::{FontGate, FontReadiness};
pub use self::normalizer::{Generation, Normalization, NormalizationStats, TokenNormalizer, TokenResolution};
pub use self::renderer::{GlyphElement, GlyphStyle, GlyphTree, render};

pub mod controller;
pub mod font_gate;
pub mod normalizer;
pub mod renderer;
