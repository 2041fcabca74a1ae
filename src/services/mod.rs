/*!
 * SignWriting service implementations.
 *
 * A service owns the glyph font faces and the FSW normalization backend the
 * display pipeline depends on:
 * - `local`: font files on disk plus the built-in FSW canonicalizer
 * - `mock`: scripted behaviors for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ServiceError;

/// Common trait for all SignWriting services
///
/// This trait defines the interface the font readiness gate, the token
/// normalizer and the export rasterizer rely on, allowing implementations to be
/// used interchangeably.
#[async_trait]
pub trait SignWritingService: Send + Sync + Debug {
    /// Load the two glyph font faces
    ///
    /// Must be idempotent: loading faces that are already loaded succeeds
    /// without doing the work again.
    ///
    /// # Returns
    /// * `Result<(), ServiceError>` - Ok when both faces are usable
    async fn load_fonts(&self) -> Result<(), ServiceError>;

    /// Whether both faces are currently loaded
    fn fonts_loaded(&self) -> bool;

    /// Wait for the font-matching subsystem to settle
    ///
    /// # Returns
    /// * `None` - the service has no such signal
    /// * `Some(result)` - the outcome of waiting on the signal
    async fn wait_fonts_settled(&self) -> Option<Result<(), ServiceError>> {
        None
    }

    /// Normalize one FSW token into its canonical form
    ///
    /// # Returns
    /// * `Ok(Some(canonical))` - the canonical form
    /// * `Ok(None)` - the token has no canonical form
    /// * `Err(ServiceError)` - the service failed on this token
    async fn normalize_fsw(&self, token: &str) -> Result<Option<String>, ServiceError>;
}

pub mod local;
pub mod mock;
