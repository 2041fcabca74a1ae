/*!
 * # SignCast - SignWriting display and export
 *
 * A Rust library that turns Formal SignWriting (FSW) tokens into a rendered
 * sign display and exports it as an image or text.
 *
 * ## Features
 *
 * - Load the SignWriting glyph fonts once per display, with a terminal failure state
 * - Normalize FSW tokens to their canonical form, one token at a time:
 *   - Tokens without a canonical form keep their raw value
 *   - Results for superseded inputs are discarded
 * - Lay signs out as a column or a row with a staggered entrance
 * - Export the display as a supersampled PNG, or as a plain-text report
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `fsw`: FSW parsing, symbol metrics and canonicalization
 * - `services`: The SignWriting service capability:
 *   - `services::local`: Local fonts and the built-in canonicalizer
 *   - `services::mock`: Scriptable service for tests
 * - `display`: Font gate, token normalizer, glyph renderer and the display controller
 * - `export`: Rasterizer, text export and artifact sinks
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod display;
pub mod errors;
pub mod export;
pub mod file_utils;
pub mod fsw;
pub mod services;

// Re-export main types for easier usage
pub use app_config::Config;
pub use display::{DisplayController, DisplayState, NormalizeOutcome};
pub use errors::{AppError, ExportFailed, FontLoadFailed, FswError, RenderError, ServiceError};
pub use export::ExportArtifact;
pub use services::SignWritingService;
