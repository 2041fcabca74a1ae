/*!
 * Integration tests for image and text exports
 */

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use signcast::app_config::{Direction, Theme};
use signcast::display::{DisplayController, DisplayState, GlyphStyle, render};
use signcast::errors::{ExportFailed, RenderError};
use signcast::export::rasterizer::rasterize;
use signcast::export::{DirectorySink, MemorySink, OutlineGlyphRenderer, RasterOptions};
use signcast::fsw::SymbolMetrics;
use signcast::services::mock::MockSignWritingService;
use crate::common;

fn three_signs() -> Vec<String> {
    common::tokens(&[common::HAND_SIGN, common::HEAD_SIGN, common::HAND_SIGN])
}

/// An export flips the exporting flag, rejects a second export and delivers a PNG
#[tokio::test]
async fn test_exportImage_onReadyDisplay_shouldBeSingleFlight() -> Result<()> {
    common::init_logger();
    let mut config = common::test_config();
    config.export.settle_delay_ms = 150;
    let (controller, sink) = common::controller_with(&config, &MockSignWritingService::working())?;
    controller.set_tokens(three_signs()).await?;
    assert!(!controller.is_exporting());

    let (first, (exporting_during, second)) = tokio::join!(controller.export_image(), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        let exporting = controller.state() == DisplayState::Ready { exporting: true };
        (exporting, controller.export_image().await)
    });

    assert!(exporting_during);
    assert!(matches!(second, Err(ExportFailed::AlreadyInProgress)));

    let artifact = first?;
    assert_eq!(artifact.mime_type, "image/png");
    assert!(artifact.file_name.starts_with("signcast-translation-"));
    assert!(artifact.file_name.ends_with(".png"));
    assert_eq!(&artifact.bytes[..8], b"\x89PNG\r\n\x1a\n");

    assert!(!controller.is_exporting());
    assert_eq!(controller.state(), DisplayState::Ready { exporting: false });
    assert_eq!(sink.delivered(), vec![artifact]);
    assert!(controller.failure_notice().is_none());
    Ok(())
}

/// Token changes during an export do not leak into the snapshot
#[tokio::test]
async fn test_exportImage_withConcurrentTokenChange_shouldUseSnapshot() -> Result<()> {
    let mut config = common::test_config();
    config.export.settle_delay_ms = 100;
    let (controller, _) = common::controller_with(&config, &MockSignWritingService::working())?;
    controller.set_tokens(three_signs()).await?;

    let (artifact, applied) = tokio::join!(controller.export_image(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.set_tokens(common::tokens(&[common::HAND_SIGN])).await
    });
    applied?;

    let expected = rasterize(
        &render(&three_signs(), Direction::Column, &GlyphStyle::default()),
        &common::outline_renderer(),
        &RasterOptions::new(2, Theme::Light),
    )?;
    let exported = image::load_from_memory(&artifact?.bytes)?;
    assert_eq!((exported.width(), exported.height()), expected.dimensions());
    assert_eq!(controller.normalized_tokens(), common::tokens(&[common::HAND_SIGN]));
    Ok(())
}

/// A renderer readiness signal replaces the settle delay
#[tokio::test]
async fn test_exportImage_withReadinessSignal_shouldSkipSettleDelay() -> Result<()> {
    let mut config = common::test_config();
    config.export.settle_delay_ms = 60_000;
    let renderer = Arc::new(common::SignalRenderer::default());
    let controller = DisplayController::new(
        &config,
        Arc::new(MockSignWritingService::working()),
        renderer.clone(),
        Arc::new(MemorySink::new()),
    )?;
    controller.set_tokens(three_signs()).await?;

    let artifact = tokio::time::timeout(Duration::from_secs(5), controller.export_image()).await??;

    assert!(!artifact.is_empty());
    assert_eq!(renderer.stable_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

/// Evicted fonts are reloaded before the snapshot
#[tokio::test]
async fn test_exportImage_afterFontEviction_shouldReloadFonts() -> Result<()> {
    let service = MockSignWritingService::working();
    let (controller, _) = common::controller_with(&common::test_config(), &service)?;
    controller.set_tokens(three_signs()).await?;

    service.unload_fonts();
    controller.export_image().await?;

    assert_eq!(service.load_calls(), 2);
    Ok(())
}

/// Exports are refused without fonts or signs, leaving a notice
#[tokio::test]
async fn test_exportImage_withoutFontsOrSigns_shouldFail() -> Result<()> {
    let (failed, _) = common::controller_with(&common::test_config(), &MockSignWritingService::failing_fonts())?;
    failed.mount().await;
    assert!(matches!(failed.export_image().await, Err(ExportFailed::FontsUnavailable)));
    assert!(failed.failure_notice().unwrap_or_default().contains("screen capture"));

    let (empty, sink) = common::controller_with(&common::test_config(), &MockSignWritingService::working())?;
    empty.mount().await;
    assert!(matches!(empty.export_image().await, Err(ExportFailed::NothingToExport)));
    assert!(matches!(empty.export_text().await, Err(ExportFailed::NothingToExport)));
    assert!(sink.delivered().is_empty());
    Ok(())
}

/// Image exports land in the output directory
#[tokio::test]
async fn test_exportImage_toDirectory_shouldWritePng() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config();
    config.display.theme = Theme::Dark;
    let controller = DisplayController::new(
        &config,
        Arc::new(MockSignWritingService::working()),
        Arc::new(common::outline_renderer()),
        Arc::new(DirectorySink::new(temp_dir.path().join("exports"))),
    )?;
    controller.set_tokens(three_signs()).await?;

    let artifact = controller.export_image().await?;

    let written = std::fs::read(temp_dir.path().join("exports").join(&artifact.file_name))?;
    let decoded = image::load_from_memory(&written)?.to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0, Theme::Dark.background());
    Ok(())
}

/// The text export lists every displayed token
#[tokio::test]
async fn test_exportText_shouldListNormalizedTokens() -> Result<()> {
    let service = MockSignWritingService::working().with_canonical("M600x600S15a04483x510", common::HAND_SIGN);
    let (controller, sink) = common::controller_with(&common::test_config(), &service)?;
    controller
        .set_tokens(common::tokens(&["M600x600S15a04483x510", common::HEAD_SIGN]))
        .await?;

    let artifact = controller.export_text().await?;
    let report = String::from_utf8(artifact.bytes.to_vec())?;

    assert_eq!(artifact.mime_type, "text/plain");
    assert!(report.contains("Number of signs: 2"));
    assert!(report.contains(&format!("1. {}", common::HAND_SIGN)));
    assert!(report.contains(&format!("2. {}", common::HEAD_SIGN)));
    assert!(report.ends_with(&format!("{} {}", common::HAND_SIGN, common::HEAD_SIGN)));
    assert_eq!(sink.delivered().len(), 1);
    Ok(())
}

/// A delivery failure mid-export clears the exporting flag and leaves a notice
#[tokio::test]
async fn test_exportImage_withFailingDelivery_shouldClearExportingFlag() -> Result<()> {
    let sink = Arc::new(common::FailingSink::default());
    let controller = DisplayController::new(
        &common::test_config(),
        Arc::new(MockSignWritingService::working()),
        Arc::new(common::outline_renderer()),
        sink.clone(),
    )?;
    controller.mount().await;
    controller.set_tokens(three_signs()).await?;

    let result = controller.export_image().await;
    assert!(matches!(result, Err(ExportFailed::Delivery(_))));
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 1);
    assert!(!controller.is_exporting());
    assert_eq!(controller.state(), DisplayState::Ready { exporting: false });
    assert!(controller.failure_notice().unwrap_or_default().contains("screen capture"));

    // the single-flight lock was released as well
    assert!(matches!(controller.export_image().await, Err(ExportFailed::Delivery(_))));
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
    Ok(())
}

/// A glyph that cannot be mounted fails the export without leaving it running
#[tokio::test]
async fn test_exportImage_withUnmountableGlyph_shouldClearExportingFlag() -> Result<()> {
    let renderer =
        OutlineGlyphRenderer::new(Arc::new(SymbolMetrics::embedded())).with_families(["OtherFamily"]);
    let sink = Arc::new(MemorySink::new());
    let controller = DisplayController::new(
        &common::test_config(),
        Arc::new(MockSignWritingService::working()),
        Arc::new(renderer),
        sink.clone(),
    )?;
    controller.mount().await;
    controller.set_tokens(three_signs()).await?;

    let result = controller.export_image().await;
    assert!(matches!(result, Err(ExportFailed::Render(RenderError::Mount { .. }))));
    assert!(!controller.is_exporting());
    assert_eq!(controller.state(), DisplayState::Ready { exporting: false });
    assert!(controller.failure_notice().unwrap_or_default().contains("screen capture"));
    assert!(sink.delivered().is_empty());
    Ok(())
}
