/*!
 * Tests for error types and conversions
 */

use signcast::errors::{AppError, ExportFailed, FontLoadFailed, FswError, RenderError, ServiceError};

#[test]
fn test_serviceError_fontLoad_shouldNameFamily() {
    let error = ServiceError::FontLoad {
        family: "SuttonSignWritingFill".to_string(),
        message: "no font file found".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("SuttonSignWritingFill"));
    assert!(display.contains("no font file found"));
}

#[test]
fn test_fontLoadFailed_shouldAskForRefresh() {
    let error = FontLoadFailed {
        reason: "network down".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("network down"));
    assert!(display.contains("Please refresh the page to try again."));
}

#[test]
fn test_fswError_coordinateOutOfRange_shouldShowCoordinate() {
    let display = format!("{}", FswError::CoordinateOutOfRange(100, 800));
    assert!(display.contains("100x800"));
}

#[test]
fn test_exportFailed_fromRenderError_shouldWrap() {
    let error: ExportFailed = RenderError::CanvasSize {
        width: 0,
        height: 20,
    }
    .into();
    assert!(matches!(error, ExportFailed::Render(_)));
    assert!(format!("{}", error).contains("0x20"));
}

#[test]
fn test_exportFailed_userNotice_shouldSuggestScreenCapture() {
    let notice = ExportFailed::AlreadyInProgress.user_notice();
    assert!(notice.contains("already in progress"));
    assert!(notice.contains("screen capture"));
}

#[test]
fn test_appError_fromFontLoadFailed_shouldWrapCorrectly() {
    let error: AppError = FontLoadFailed {
        reason: "timeout".to_string(),
    }
    .into();
    assert!(matches!(error, AppError::Fonts(_)));
    assert!(format!("{}", error).starts_with("Font error"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(message) if message.contains("missing.json")));
}

#[test]
fn test_appError_fromAnyhow_shouldBecomeUnknown() {
    let error: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(error, AppError::Unknown(message) if message == "boom"));
}
