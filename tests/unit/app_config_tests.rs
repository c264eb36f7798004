/*!
 * Tests for application configuration
 */

use anyhow::Result;
use dubline::app_config::{Config, EmotionConfig, LogLevel, SynthesisEngine, TranslationProvider};
use dubline::synthesis::{Gender, Voice};

use crate::common;

/// Test that a written default config reads back unchanged
#[test]
fn test_config_withDefaultValues_shouldRoundTripThroughFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config::default();
    let path = common::create_test_file(temp_dir.path(), "conf.json", &serde_json::to_string_pretty(&config)?)?;

    let loaded: Config = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    assert_eq!(loaded.target_language, config.target_language);
    assert_eq!(loaded.synthesis.args, config.synthesis.args);
    assert_eq!(loaded.timing.stretch_floor, 0.44);
    assert_eq!(loaded.log_level, LogLevel::Info);
    assert!(loaded.validate().is_ok());
    Ok(())
}

/// Test that an explicit provider without a key is rejected
#[test]
fn test_validate_withExplicitProviderAndNoKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenRouter;
    for provider in &mut config.translation.available_providers {
        provider.api_key.clear();
    }
    // Only meaningful when the environment has no key either
    if std::env::var("OPENROUTER_API_KEY").map(|k| k.trim().is_empty()).unwrap_or(true) {
        assert!(config.validate().is_err());
    }
}

/// Test that auto mode validates without any key
#[test]
fn test_validate_withAutoProviderAndNoKey_shouldPass() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Auto;
    for provider in &mut config.translation.available_providers {
        provider.api_key.clear();
    }
    assert!(config.validate().is_ok());
}

/// Test range checks on the timing policy
#[test]
fn test_validate_withInvalidTiming_shouldFail() {
    let mut config = Config::default();
    config.timing.silence_cap_secs = -0.1;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.timing.stretch_floor = f64::NAN;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.timing.sample_rate = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.synthesis.concurrent_requests = 0;
    assert!(config.validate().is_err());
}

/// Test provider names parse case-insensitively
#[test]
fn test_translationProvider_fromStr_shouldParseNames() -> Result<()> {
    assert_eq!("OpenRouter".parse::<TranslationProvider>()?, TranslationProvider::OpenRouter);
    assert_eq!("groq".parse::<TranslationProvider>()?, TranslationProvider::Groq);
    assert_eq!("AUTO".parse::<TranslationProvider>()?, TranslationProvider::Auto);
    assert!("ollama".parse::<TranslationProvider>().is_err());
    assert_eq!(TranslationProvider::Groq.to_string(), "groq");
    Ok(())
}

/// Test the optional emotion section
#[test]
fn test_config_withEmotionSection_shouldEnableClassifier() -> Result<()> {
    let json = r#"{
        "source_language": "en",
        "target_language": "fr",
        "emotion": {"command": "ser", "args": ["--wav", "{audio}"]}
    }"#;
    let config: Config = serde_json::from_str(json)?;
    let emotion: &EmotionConfig = config.emotion.as_ref().ok_or_else(|| anyhow::anyhow!("missing"))?;
    assert_eq!(emotion.command, "ser");
    assert_eq!(emotion.timeout_secs, 30);
    assert_eq!(emotion.concurrent_requests, 2);
    Ok(())
}

/// Test that classifier concurrency does not follow the translation setting
#[test]
fn test_emotionConcurrency_withTranslationConcurrency_shouldStayIndependent() -> Result<()> {
    let json = r#"{
        "source_language": "en",
        "target_language": "fr",
        "translation": {"concurrent_requests": 16},
        "emotion": {"command": "ser", "concurrent_requests": 3}
    }"#;
    let config: Config = serde_json::from_str(json)?;
    assert_eq!(config.translation.concurrent_requests, 16);
    assert_eq!(config.emotion_concurrency(), 3);

    let mut without_emotion = config.clone();
    without_emotion.emotion = None;
    assert_eq!(without_emotion.emotion_concurrency(), 2);

    let mut zero = config;
    if let Some(emotion) = zero.emotion.as_mut() {
        emotion.concurrent_requests = 0;
    }
    assert!(zero.validate().is_err());
    Ok(())
}

/// Test that the reconciler settings follow timing and synthesis sections
#[test]
fn test_reconcileConfig_withCustomValues_shouldCopyThem() {
    let mut config = Config::default();
    config.timing.silence_cap_secs = 0.5;
    config.synthesis.tail_trim_ms = 200;
    let reconcile = config.reconcile_config();
    assert_eq!(reconcile.silence_cap_secs, 0.5);
    assert_eq!(reconcile.tail_trim_ms, 200);
    assert_eq!(reconcile.sample_rate, config.timing.sample_rate);
}

/// Test the Google synthesis section and the voice it yields
#[test]
fn test_config_withGoogleEngine_shouldBuildStockVoice() -> Result<()> {
    let json = r#"{
        "source_language": "en",
        "target_language": "de",
        "synthesis": {
            "engine": "google",
            "google": {"api_key": "k", "voice_name": "de-DE-Wavenet-B", "gender": "MALE"}
        }
    }"#;
    let config: Config = serde_json::from_str(json)?;
    assert_eq!(config.synthesis.engine, SynthesisEngine::Google);
    assert_eq!(config.synthesis.google.endpoint, "https://texttospeech.googleapis.com/v1");
    assert_eq!(
        config.synthesis.google.voice(),
        Voice::Params { name: Some("de-DE-Wavenet-B".to_string()), gender: Gender::Male }
    );
    config.validate()?;
    assert_eq!(Config::default().synthesis.engine, SynthesisEngine::Command);
    Ok(())
}

/// Test that bad Google settings are rejected
#[test]
fn test_validate_withBadGoogleSettings_shouldFail() {
    let mut config = Config::default();
    config.synthesis.engine = SynthesisEngine::Google;
    config.synthesis.google.api_key = "k".to_string();
    config.synthesis.google.pitch = 40.0;
    assert!(config.validate().is_err());

    config.synthesis.google.pitch = 0.0;
    config.synthesis.google.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    // Only the command engine needs an executable
    config.synthesis.google.endpoint = "https://texttospeech.googleapis.com/v1".to_string();
    config.synthesis.command = String::new();
    assert!(config.validate().is_ok());
}
