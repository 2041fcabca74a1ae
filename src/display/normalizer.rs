/*!
 * Token normalization.
 *
 * Tokens are sent to the service one at a time, in input order. Each token is
 * handled independently: an empty answer, an error or a timeout falls back to
 * the raw token at the same index, so the output always has exactly one entry
 * per input token.
 *
 * Every input change takes a new generation; a result is only committed when
 * its generation is still the newest.
 */

use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::services::SignWritingService;

/// Identity of one input snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// How a single token was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenResolution {
    /// The service returned a canonical form
    Canonical,
    /// The service had no canonical form
    EmptyFallback,
    /// The service failed
    ErrorFallback,
    /// The service did not answer in time
    TimeoutFallback,
}

/// Counters for one normalization run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    pub canonical: usize,
    pub empty_fallbacks: usize,
    pub error_fallbacks: usize,
    pub timeout_fallbacks: usize,
}

impl NormalizationStats {
    fn record(&mut self, resolution: TokenResolution) {
        match resolution {
            TokenResolution::Canonical => self.canonical += 1,
            TokenResolution::EmptyFallback => self.empty_fallbacks += 1,
            TokenResolution::ErrorFallback => self.error_fallbacks += 1,
            TokenResolution::TimeoutFallback => self.timeout_fallbacks += 1,
        }
    }

    /// Tokens that kept their raw form
    pub fn fallbacks(&self) -> usize {
        self.empty_fallbacks + self.error_fallbacks + self.timeout_fallbacks
    }
}

/// Output of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalization {
    pub generation: Generation,
    pub tokens: Vec<String>,
    pub resolutions: Vec<TokenResolution>,
    pub stats: NormalizationStats,
}

/// Sequential per-token normalizer with fallback and staleness tracking
#[derive(Debug)]
pub struct TokenNormalizer {
    service: Arc<dyn SignWritingService>,
    token_timeout: Option<Duration>,
    latest: AtomicU64,
}

impl TokenNormalizer {
    pub fn new(service: Arc<dyn SignWritingService>, token_timeout: Option<Duration>) -> Self {
        Self {
            service,
            token_timeout,
            latest: AtomicU64::new(0),
        }
    }

    /// Start a new input snapshot, superseding every earlier one
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer snapshot has started since `generation`
    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Normalize a snapshot. Never fails and never changes the token count.
    pub async fn normalize(&self, generation: Generation, tokens: &[String]) -> Normalization {
        let mut normalized = Vec::with_capacity(tokens.len());
        let mut resolutions = Vec::with_capacity(tokens.len());
        let mut stats = NormalizationStats::default();

        for (index, token) in tokens.iter().enumerate() {
            let (value, resolution) = self.normalize_one(index, token).await;
            stats.record(resolution);
            normalized.push(value);
            resolutions.push(resolution);
        }

        debug!(
            "Normalized {} token(s): {} canonical, {} fallback",
            tokens.len(),
            stats.canonical,
            stats.fallbacks()
        );

        Normalization {
            generation,
            tokens: normalized,
            resolutions,
            stats,
        }
    }

    async fn normalize_one(&self, index: usize, token: &str) -> (String, TokenResolution) {
        let call = self.service.normalize_fsw(token);
        let answer = match self.token_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(answer) => answer,
                Err(_) => {
                    warn!("Normalization of token {} timed out after {:?}", index + 1, limit);
                    return (token.to_string(), TokenResolution::TimeoutFallback);
                }
            },
            None => call.await,
        };

        match answer {
            Ok(Some(canonical)) if !canonical.trim().is_empty() => {
                (canonical, TokenResolution::Canonical)
            }
            Ok(_) => {
                debug!("No canonical form for token {} ('{}'), keeping raw", index + 1, token);
                (token.to_string(), TokenResolution::EmptyFallback)
            }
            Err(e) => {
                debug!("Token {} failed to normalize, keeping raw: {}", index + 1, e);
                (token.to_string(), TokenResolution::ErrorFallback)
            }
        }
    }
}
