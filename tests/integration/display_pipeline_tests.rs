/*!
 * Integration tests for tokens flowing through gate, normalizer and renderer
 */

use anyhow::Result;
use std::time::Duration;

use signcast::app_config::{Config, Direction};
use signcast::display::{DisplayController, DisplayState, GlyphTree, NormalizeOutcome};
use signcast::services::mock::MockSignWritingService;
use crate::common;

/// One valid token is echoed, rendered once, and the display is ready
#[tokio::test]
async fn test_singleCanonicalToken_shouldRenderOneElement() -> Result<()> {
    common::init_logger();
    let service = MockSignWritingService::working();
    let (controller, _) = common::controller_with(&common::test_config(), &service)?;

    let outcome = controller.set_tokens(common::tokens(&[common::HAND_SIGN])).await?;

    assert!(matches!(outcome, NormalizeOutcome::Applied { count: 1, .. }));
    assert_eq!(controller.normalized_tokens(), common::tokens(&[common::HAND_SIGN]));
    assert_eq!(controller.glyph_tree().len(), 1);
    assert_eq!(controller.state(), DisplayState::Ready { exporting: false });
    Ok(())
}

/// No tokens means nothing to normalize and nothing to render
#[tokio::test]
async fn test_emptyInput_shouldBeEmptyWithoutNormalizing() -> Result<()> {
    let service = MockSignWritingService::working();
    let (controller, _) = common::controller_with(&common::test_config(), &service)?;

    controller.set_tokens(Vec::new()).await?;

    assert_eq!(controller.state(), DisplayState::Empty);
    assert_eq!(controller.glyph_tree(), GlyphTree::Empty);
    assert!(service.normalize_calls().is_empty());
    Ok(())
}

/// A font failure stops the pipeline before normalization and never recovers
#[tokio::test]
async fn test_fontFailure_shouldBeTerminalAndSkipNormalization() -> Result<()> {
    let service = MockSignWritingService::failing_fonts();
    let (controller, _) = common::controller_with(&common::test_config(), &service)?;

    assert_eq!(controller.state(), DisplayState::Loading);
    let error = controller
        .set_tokens(common::tokens(&[common::HAND_SIGN]))
        .await
        .unwrap_err();
    assert!(error.to_string().contains("refresh"));

    assert_eq!(controller.state(), DisplayState::FontLoadFailed);
    assert!(controller.set_tokens(common::tokens(&["other"])).await.is_err());
    assert_eq!(controller.mount().await, DisplayState::FontLoadFailed);

    assert!(service.normalize_calls().is_empty());
    assert_eq!(service.load_calls(), 1);
    assert_eq!(controller.glyph_tree(), GlyphTree::Empty);
    Ok(())
}

/// A failing token keeps its raw value at its position
#[tokio::test]
async fn test_failingToken_shouldFallBackInPlace() -> Result<()> {
    let service = MockSignWritingService::working()
        .with_failing_token("bad-token")
        .with_canonical("M600x600S15a04483x510", common::HAND_SIGN);
    let (controller, _) = common::controller_with(&common::test_config(), &service)?;

    let outcome = controller
        .set_tokens(common::tokens(&["bad-token", "M600x600S15a04483x510"]))
        .await?;

    let NormalizeOutcome::Applied { count, stats } = outcome else {
        panic!("expected the tokens to be applied");
    };
    assert_eq!(count, 2);
    assert_eq!(stats.error_fallbacks, 1);
    assert_eq!(controller.normalized_tokens(), common::tokens(&["bad-token", common::HAND_SIGN]));

    let tree = controller.glyph_tree();
    let elements = tree.elements();
    assert_eq!(elements[0].fsw, "bad-token");
    assert_eq!(elements[1].fsw, common::HAND_SIGN);
    assert_eq!(elements[1].key(), "sign-1");
    assert_eq!(elements[1].entrance_delay(), Duration::from_millis(100));
    Ok(())
}

/// Only the newest token sequence is ever displayed
#[tokio::test]
async fn test_rapidInputChanges_shouldDisplayNewestOnly() -> Result<()> {
    let service = MockSignWritingService::working().with_normalize_delay(40);
    let (controller, _) = common::controller_with(&common::test_config(), &service)?;

    let (first, second, third) = tokio::join!(
        controller.set_tokens(common::tokens(&["a", "b"])),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            controller.set_tokens(common::tokens(&["c"])).await
        },
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            controller.set_tokens(common::tokens(&["d", "e", "f"])).await
        }
    );

    assert_eq!(first?, NormalizeOutcome::Superseded);
    assert_eq!(second?, NormalizeOutcome::Superseded);
    assert!(matches!(third?, NormalizeOutcome::Applied { count: 3, .. }));
    assert_eq!(controller.normalized_tokens(), common::tokens(&["d", "e", "f"]));
    assert_eq!(controller.raw_tokens(), common::tokens(&["d", "e", "f"]));
    Ok(())
}

/// A hung token times out and keeps its raw value
#[tokio::test]
async fn test_tokenTimeout_shouldNotStallThePipeline() -> Result<()> {
    let mut config = common::test_config();
    config.normalization.token_timeout_ms = Some(20);
    let service = MockSignWritingService::working()
        .with_token_delay("hung", 5_000)
        .with_canonical("M600x600S15a04483x510", common::HAND_SIGN);
    let (controller, _) = common::controller_with(&config, &service)?;

    let outcome = controller
        .set_tokens(common::tokens(&["hung", "M600x600S15a04483x510"]))
        .await?;

    assert!(matches!(outcome, NormalizeOutcome::Applied { stats, .. } if stats.timeout_fallbacks == 1));
    assert_eq!(controller.normalized_tokens(), common::tokens(&["hung", common::HAND_SIGN]));
    Ok(())
}

/// The configured direction and size reach the glyph tree
#[tokio::test]
async fn test_rowDirection_shouldBeCarriedByTree() -> Result<()> {
    let mut config = common::test_config();
    config.display.direction = Direction::Row;
    config.display.sign_size = 24;
    let (controller, _) = common::controller_with(&config, &MockSignWritingService::working())?;

    controller.set_tokens(common::tokens(&[common::HAND_SIGN, common::HEAD_SIGN])).await?;

    match controller.glyph_tree() {
        GlyphTree::Signs { direction, style, elements } => {
            assert_eq!(direction, Direction::Row);
            assert_eq!(style.size, 24);
            assert_eq!(elements.len(), 2);
        }
        GlyphTree::Empty => panic!("expected signs"),
    }
    assert_eq!(controller.status_line(), "2 signs · Ready");
    Ok(())
}

/// Mounting twice loads the fonts once
#[tokio::test]
async fn test_mount_twice_shouldLoadFontsOnce() -> Result<()> {
    let service = MockSignWritingService::working().with_font_delay(10);
    let (controller, _) = common::controller_with(&common::test_config(), &service)?;

    let (a, b) = tokio::join!(controller.mount(), controller.mount());
    assert_eq!(a, DisplayState::Empty);
    assert_eq!(b, DisplayState::Empty);
    assert_eq!(controller.mount().await, DisplayState::Empty);
    assert_eq!(service.load_calls(), 1);
    Ok(())
}

/// A valid sign using symbols without a known size is shown exactly as given
#[tokio::test]
async fn test_localDisplay_withUnlistedSymbols_shouldKeepSignUnchanged() -> Result<()> {
    let controller = DisplayController::from_config(&Config::default())?;
    assert_eq!(controller.mount().await, DisplayState::Ready { exporting: false });

    let sign = "M518x529S14c20481x471S27106503x489";
    let outcome = controller.set_tokens(common::tokens(&[sign, common::HAND_SIGN])).await?;

    match outcome {
        NormalizeOutcome::Applied { count, stats } => {
            assert_eq!(count, 2);
            assert_eq!(stats.empty_fallbacks, 1);
            assert_eq!(stats.canonical, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(controller.normalized_tokens(), common::tokens(&[sign, common::HAND_SIGN]));
    Ok(())
}
