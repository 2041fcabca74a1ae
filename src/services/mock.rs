/*!
 * Mock SignWriting service for testing.
 *
 * This module provides a mock service that simulates different behaviors:
 * - `MockSignWritingService::working()` - Fonts load, tokens are echoed back
 * - `MockSignWritingService::empty()` - Fonts load, no token has a canonical form
 * - `MockSignWritingService::failing_fonts()` - Font loading always errors
 * - `MockSignWritingService::failing_normalization()` - Every normalization errors
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ServiceError;

use super::SignWritingService;

/// Behavior mode for normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns the token unchanged (or its scripted canonical form)
    Echo,
    /// Returns no canonical form
    Empty,
    /// Always fails with an error
    Failing,
}

/// Mock service for testing the display pipeline
#[derive(Debug, Clone)]
pub struct MockSignWritingService {
    behavior: MockBehavior,
    font_failure: Option<String>,
    font_delay: Duration,
    normalize_delay: Duration,
    token_delays: HashMap<String, Duration>,
    settle_signal: Option<Result<(), String>>,
    failing_tokens: Vec<String>,
    canonical: HashMap<String, String>,
    load_calls: Arc<AtomicUsize>,
    settle_calls: Arc<AtomicUsize>,
    normalize_calls: Arc<Mutex<Vec<String>>>,
    loaded: Arc<AtomicBool>,
}

impl MockSignWritingService {
    /// Create a new mock service with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            font_failure: None,
            font_delay: Duration::ZERO,
            normalize_delay: Duration::ZERO,
            token_delays: HashMap::new(),
            settle_signal: None,
            failing_tokens: Vec::new(),
            canonical: HashMap::new(),
            load_calls: Arc::new(AtomicUsize::new(0)),
            settle_calls: Arc::new(AtomicUsize::new(0)),
            normalize_calls: Arc::new(Mutex::new(Vec::new())),
            loaded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a working mock that echoes tokens
    pub fn working() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that never finds a canonical form
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock whose normalization always errors
    pub fn failing_normalization() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose font loading always errors
    pub fn failing_fonts() -> Self {
        Self::working().with_font_failure("simulated font load error")
    }

    /// Make font loading fail with a message
    pub fn with_font_failure(mut self, message: &str) -> Self {
        self.font_failure = Some(message.to_string());
        self
    }

    /// Delay every font load
    pub fn with_font_delay(mut self, delay_ms: u64) -> Self {
        self.font_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Delay every normalization call
    pub fn with_normalize_delay(mut self, delay_ms: u64) -> Self {
        self.normalize_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Delay normalization of one token
    pub fn with_token_delay(mut self, token: &str, delay_ms: u64) -> Self {
        self.token_delays.insert(token.to_string(), Duration::from_millis(delay_ms));
        self
    }

    /// Expose a settling signal with the given outcome
    pub fn with_settle_signal(mut self, outcome: Result<(), String>) -> Self {
        self.settle_signal = Some(outcome);
        self
    }

    /// Make normalization of one token fail
    pub fn with_failing_token(mut self, token: &str) -> Self {
        self.failing_tokens.push(token.to_string());
        self
    }

    /// Script the canonical form returned for a token
    pub fn with_canonical(mut self, raw: &str, canonical: &str) -> Self {
        self.canonical.insert(raw.to_string(), canonical.to_string());
        self
    }

    /// Number of `load_fonts` calls
    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    /// Number of settle signal waits
    pub fn settle_calls(&self) -> usize {
        self.settle_calls.load(Ordering::SeqCst)
    }

    /// Tokens passed to `normalize_fsw`, in call order
    pub fn normalize_calls(&self) -> Vec<String> {
        self.normalize_calls.lock().clone()
    }

    /// Forget that fonts were loaded, as if the host evicted them
    pub fn unload_fonts(&self) {
        self.loaded.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl SignWritingService for MockSignWritingService {
    async fn load_fonts(&self) -> Result<(), ServiceError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);

        if !self.font_delay.is_zero() {
            tokio::time::sleep(self.font_delay).await;
        }

        if let Some(message) = &self.font_failure {
            return Err(ServiceError::FontLoad {
                family: "SuttonSignWritingLine".to_string(),
                message: message.clone(),
            });
        }

        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn fonts_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    async fn wait_fonts_settled(&self) -> Option<Result<(), ServiceError>> {
        let outcome = self.settle_signal.clone()?;
        self.settle_calls.fetch_add(1, Ordering::SeqCst);
        Some(outcome.map_err(ServiceError::Settle))
    }

    async fn normalize_fsw(&self, token: &str) -> Result<Option<String>, ServiceError> {
        self.normalize_calls.lock().push(token.to_string());

        let delay = self.token_delays.get(token).copied().unwrap_or(self.normalize_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing_tokens.iter().any(|t| t == token) {
            return Err(ServiceError::Normalization {
                token: token.to_string(),
                message: "Simulated normalization failure".to_string(),
            });
        }

        match self.behavior {
            MockBehavior::Echo => Ok(Some(
                self.canonical.get(token).cloned().unwrap_or_else(|| token.to_string()),
            )),
            MockBehavior::Empty => Ok(None),
            MockBehavior::Failing => Err(ServiceError::Normalization {
                token: token.to_string(),
                message: "Simulated normalization failure".to_string(),
            }),
        }
    }
}
