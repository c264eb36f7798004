/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use dubline::app_config::Config;
use dubline::app_controller::Controller;
use dubline::emotion::DisabledClassifier;
use dubline::timeline::Emotion;

use crate::common::{self, mock_collaborators::MapTranslator};

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config().target_language, "fr");
    Ok(())
}

/// Test the controller with custom configuration
#[test]
fn test_controller_withCustomConfig_shouldKeepIt() -> Result<()> {
    let mut config = Config::default();
    config.source_language = "es".to_string();
    config.target_language = "de".to_string();

    let controller = Controller::with_config(config)?;
    assert_eq!(controller.config().source_language, "es");
    assert_eq!(controller.config().target_language, "de");
    Ok(())
}

/// The plan stage runs without source audio and leaves emotions unset
#[tokio::test]
async fn test_plan_withoutSourceAudio_shouldSkipEmotion() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let transcript = common::create_test_transcript(temp_dir.path())?;
    let rttm = common::create_test_rttm(temp_dir.path())?;
    let controller = Controller::with_config(common::test_config())?;

    let translator = MapTranslator::new(&[("Goodbye now.", "Au revoir.")]);
    let plan = controller
        .plan(&transcript, &rttm, None, &translator, &DisabledClassifier)
        .await?;

    assert_eq!(plan.records.len(), 3);
    assert_eq!(plan.records[2].translated_text, "Au revoir.");
    assert_eq!(plan.records[0].translated_text, "Hello there.");
    assert!(plan.records.iter().all(|r| r.emotion == Emotion::None));
    assert_eq!(plan.speaker_turns.len(), 2);
    Ok(())
}

/// Speaker turns all below the minimum send every sentence to the fallback speaker
#[test]
fn test_plan_withOnlyShortTurns_shouldUseFallbackSpeaker() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let transcript = common::create_test_transcript(temp_dir.path())?;
    let rttm = common::create_test_file(
        temp_dir.path(),
        "short.json",
        r#"[{"start": 1.0, "end": 2.0, "speaker_id": "SPEAKER_07"}]"#,
    )?;

    let mut config = common::test_config();
    config.timing.fallback_speaker = "NARRATOR".to_string();
    let controller = Controller::with_config(config)?;

    let translator = MapTranslator::default();
    let plan = tokio_test::block_on(async {
        controller
            .plan(&transcript, &rttm, None, &translator, &DisabledClassifier)
            .await
    })?;

    assert!(plan.records.iter().all(|r| r.speaker_id == "NARRATOR"));
    assert_eq!(plan.attribution.by_fallback, 3);
    Ok(())
}
