/*!
 * Error types for the signcast pipeline.
 *
 * This module contains custom error types for the different stages of the
 * SignWriting pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by a SignWriting service collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// A glyph font face could not be loaded
    #[error("Failed to load font '{family}': {message}")]
    FontLoad {
        /// Font family that failed
        family: String,
        /// Underlying cause
        message: String,
    },

    /// The service rejected or could not process an FSW token
    #[error("Normalization failed for '{token}': {message}")]
    Normalization {
        /// The offending token
        token: String,
        /// Underlying cause
        message: String,
    },

    /// The font settling signal reported an error
    #[error("Font settling failed: {0}")]
    Settle(String),
}

/// Errors produced while parsing FSW notation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FswError {
    /// The token is not a sign or a symbol
    #[error("Not a valid FSW sign or symbol: '{0}'")]
    InvalidToken(String),

    /// A symbol key is outside the ISWA range
    #[error("Symbol key out of range: '{0}'")]
    SymbolOutOfRange(String),

    /// A coordinate is outside the 250..=749 plane
    #[error("Coordinate out of range: {0}x{1}")]
    CoordinateOutOfRange(i32, i32),
}

/// The font readiness gate resolved to failure. Terminal for a mount.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("SignWriting fonts failed to load: {reason}. Please refresh the page to try again.")]
pub struct FontLoadFailed {
    /// What went wrong
    pub reason: String,
}

/// Errors raised by a glyph renderer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The canonical FSW string could not be mounted
    #[error("Cannot render sign '{token}': {message}")]
    Mount {
        /// Token being rendered
        token: String,
        /// Underlying cause
        message: String,
    },

    /// The requested bitmap would be empty or too large
    #[error("Invalid canvas size {width}x{height}")]
    CanvasSize {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
}

/// Errors that end an export attempt
#[derive(Error, Debug)]
pub enum ExportFailed {
    /// Another export is still running on this display
    #[error("An export is already in progress")]
    AlreadyInProgress,

    /// There are no signs to export
    #[error("Nothing to export: no signs are displayed")]
    NothingToExport,

    /// Fonts were not confirmed loaded before snapshotting
    #[error("SignWriting fonts are not loaded")]
    FontsUnavailable,

    /// A glyph could not be painted
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// PNG encoding failed
    #[error("Image encoding failed: {0}")]
    Encode(String),

    /// Delivering the artifact failed
    #[error("Could not save export: {0}")]
    Delivery(String),
}

impl ExportFailed {
    /// User-facing notice shown when an export fails
    pub fn user_notice(&self) -> String {
        format!(
            "Export failed ({}). Please take a screen capture of the SignWriting area instead.",
            self
        )
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a service
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Fonts never became ready
    #[error("Font error: {0}")]
    Fonts(#[from] FontLoadFailed),

    /// Error from an export
    #[error("Export error: {0}")]
    Export(#[from] ExportFailed),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
