/*!
 * Integration tests for the display lifecycle driven from a config file
 */

use anyhow::Result;

use signcast::app_config::Config;
use signcast::display::{DisplayController, DisplayState};
use signcast::file_utils::FileManager;
use crate::common;

/// Config file, token file, normalization and both exports with the local service
#[test]
fn test_lifecycle_withLocalService_shouldExportToOutputDir() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let config_path = temp_dir.path().join("signcast.json");

    let mut config = Config::load_or_create(&config_path)?;
    config.export.settle_delay_ms = 0;
    config.export.output_dir = Some(temp_dir.path().join("out"));
    config.validate()?;

    let token_file = common::create_test_file(
        temp_dir.path(),
        "signs.txt",
        "M600x600S15a04483x510\nbad-token\n",
    )?;
    let tokens = FileManager::read_tokens(&token_file)?;

    let controller = DisplayController::from_config(&config)?;

    tokio_test::block_on(async {
        assert_eq!(controller.mount().await, DisplayState::Empty);
        controller.set_tokens(tokens).await?;

        assert_eq!(
            controller.normalized_tokens(),
            common::tokens(&[common::HAND_SIGN, "bad-token"])
        );

        let image = controller.export_image().await?;
        let text = controller.export_text().await?;

        let out = temp_dir.path().join("out");
        assert!(FileManager::file_exists(out.join(&image.file_name)));
        let report = FileManager::read_to_string(out.join(&text.file_name))?;
        assert!(report.contains("Number of signs: 2"));
        Ok::<(), anyhow::Error>(())
    })?;

    assert_eq!(controller.status_line(), "2 signs · Ready");
    Ok(())
}

/// A font directory without the faces makes the display fail for good
#[test]
fn test_lifecycle_withMissingFonts_shouldShowFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = Config::default();
    config.fonts.font_dir = Some(temp_dir.path().to_path_buf());

    let controller = DisplayController::from_config(&config)?;
    let state = tokio_test::block_on(controller.mount());

    assert_eq!(state, DisplayState::FontLoadFailed);
    assert!(state.message().unwrap_or_default().contains("refresh"));
    assert_eq!(controller.status_line(), "0 signs · Font Loading Failed");
    Ok(())
}

/// Invalid settings are rejected before a display is built
#[test]
fn test_lifecycle_withInvalidColor_shouldFailToBuild() {
    let mut config = Config::default();
    config.display.color = Some("not-a-color".to_string());
    assert!(DisplayController::from_config(&config).is_err());
}
