/*!
 * Font readiness gate.
 *
 * Loads the two glyph font faces once per mount and caches the outcome. Every
 * caller, concurrent or not, observes the same result; a failure is terminal
 * for the lifetime of the gate.
 */

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::errors::FontLoadFailed;
use crate::services::SignWritingService;

/// Tri-state font readiness. Only ever moves from `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontReadiness {
    Unknown,
    Ready,
    Failed,
}

/// Gate that resolves once the glyph fonts can be used
#[derive(Debug)]
pub struct FontGate {
    service: Arc<dyn SignWritingService>,
    outcome: OnceCell<Result<(), FontLoadFailed>>,
    load_timeout: Option<Duration>,
}

impl FontGate {
    pub fn new(service: Arc<dyn SignWritingService>, load_timeout: Option<Duration>) -> Self {
        Self {
            service,
            outcome: OnceCell::new(),
            load_timeout,
        }
    }

    /// Make sure the fonts are loaded and settled.
    ///
    /// The first call performs the load; later and concurrent calls wait for
    /// and return the cached outcome without touching the service again.
    pub async fn ensure_ready(&self) -> Result<(), FontLoadFailed> {
        self.outcome.get_or_init(|| self.load()).await.clone()
    }

    async fn load(&self) -> Result<(), FontLoadFailed> {
        debug!("Loading SignWriting fonts");

        let loaded = match self.load_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.service.load_fonts()).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => Err(format!("font load timed out after {:?}", limit)),
            },
            None => self.service.load_fonts().await.map_err(|e| e.to_string()),
        };

        if let Err(reason) = loaded {
            error!("Failed to load SignWriting fonts: {}", reason);
            return Err(FontLoadFailed { reason });
        }

        match self.service.wait_fonts_settled().await {
            Some(Ok(())) => debug!("Font matching settled"),
            Some(Err(e)) => warn!("Ignoring font settle failure: {}", e),
            None => debug!("No font settle signal available"),
        }

        info!("SignWriting fonts ready");
        Ok(())
    }

    /// Current readiness without waiting
    pub fn readiness(&self) -> FontReadiness {
        match self.outcome.get() {
            None => FontReadiness::Unknown,
            Some(Ok(())) => FontReadiness::Ready,
            Some(Err(_)) => FontReadiness::Failed,
        }
    }

    /// The failure, once the gate failed
    pub fn failure(&self) -> Option<FontLoadFailed> {
        self.outcome.get().and_then(|outcome| outcome.clone().err())
    }

    /// Re-check the faces right before they are used for a snapshot.
    ///
    /// Cheap when they are still loaded; reloads them through the service if
    /// they were evicted. Never changes the cached readiness.
    pub async fn reconfirm(&self) -> bool {
        if self.readiness() != FontReadiness::Ready {
            return false;
        }
        if self.service.fonts_loaded() {
            return true;
        }

        warn!("SignWriting fonts were evicted, reloading before export");
        match self.service.load_fonts().await {
            Ok(()) => self.service.fonts_loaded(),
            Err(e) => {
                error!("Reloading SignWriting fonts failed: {}", e);
                false
            }
        }
    }
}
