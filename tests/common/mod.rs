/*!
 * Common test utilities for the signcast test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use signcast::app_config::Config;
use signcast::display::{DisplayController, GlyphStyle};
use signcast::errors::{ExportFailed, RenderError};
use signcast::export::{
    ArtifactSink, ExportArtifact, GlyphRenderer, MemorySink, OutlineGlyphRenderer, VisualHandle,
};
use signcast::fsw::SymbolMetrics;
use signcast::services::mock::MockSignWritingService;

/// A canonical one-hand sign
pub const HAND_SIGN: &str = "M508x531S15a04483x510";

/// A sign with a head symbol, canonical
pub const HEAD_SIGN: &str = "M518x518S2ff00482x482";

/// Route library logs through the test harness
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Owned token list from string literals
pub fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|t| t.to_string()).collect()
}

/// Default configuration with no settling delay
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.export.settle_delay_ms = 0;
    config
}

/// Outline renderer over the embedded metrics
pub fn outline_renderer() -> OutlineGlyphRenderer {
    OutlineGlyphRenderer::new(Arc::new(SymbolMetrics::embedded()))
}

/// Display backed by a mock service and an in-memory sink
pub fn controller_with(
    config: &Config,
    service: &MockSignWritingService,
) -> Result<(DisplayController, Arc<MemorySink>)> {
    let sink = Arc::new(MemorySink::new());
    let controller = DisplayController::new(
        config,
        Arc::new(service.clone()),
        Arc::new(outline_renderer()),
        sink.clone(),
    )?;
    Ok((controller, sink))
}

/// Outline renderer that reports a readiness signal
#[derive(Debug, Default)]
pub struct SignalRenderer {
    pub stable_calls: AtomicUsize,
}

#[async_trait]
impl GlyphRenderer for SignalRenderer {
    fn mount(&self, fsw: &str, style: &GlyphStyle, scale: u32) -> Result<VisualHandle, RenderError> {
        outline_renderer().mount(fsw, style, scale)
    }

    async fn wait_until_stable(&self) -> Option<()> {
        self.stable_calls.fetch_add(1, Ordering::SeqCst);
        Some(())
    }
}

/// Sink whose deliveries always fail
#[derive(Debug, Default)]
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl ArtifactSink for FailingSink {
    async fn deliver(&self, _artifact: &ExportArtifact) -> Result<(), ExportFailed> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ExportFailed::Delivery("disk full".to_string()))
    }
}
