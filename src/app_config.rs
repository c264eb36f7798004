use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::synthesis::{Gender, Voice};
use crate::timeline::attributor::{DEFAULT_FALLBACK_SPEAKER, DEFAULT_MIN_TURN_SECS};
use crate::timeline::reconciler::{
    ReconcileConfig, DEFAULT_SAMPLE_RATE, DEFAULT_STRETCH_FLOOR, DEFAULT_TAIL_TRIM_MS,
};
use crate::timeline::silence::DEFAULT_SILENCE_CAP_SECS;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Speech synthesis config
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Timing policy
    #[serde(default)]
    pub timing: TimingConfig,

    /// Tempo stretch tool
    #[serde(default)]
    pub tempo: TempoConfig,

    /// Emotion classifier, disabled when absent
    #[serde(default)]
    pub emotion: Option<EmotionConfig>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider selection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenRouter first, Groq second
    #[default]
    Auto,
    // @provider: OpenRouter
    OpenRouter,
    // @provider: Groq
    Groq,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Auto => "Auto",
            Self::OpenRouter => "OpenRouter",
            Self::Groq => "Groq",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Auto => "auto".to_string(),
            Self::OpenRouter => "openrouter".to_string(),
            Self::Groq => "groq".to_string(),
        }
    }

    // @returns: Concrete providers to try, in order
    pub fn chain(&self) -> Vec<TranslationProvider> {
        match self {
            Self::Auto => vec![Self::OpenRouter, Self::Groq],
            other => vec![other.clone()],
        }
    }

    // @returns: Environment variables holding this provider's API key
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Auto => &[],
            Self::OpenRouter => &["OPENROUTER_API_KEY"],
            Self::Groq => &["GROQ_TOKEN", "GROQ_API_KEY", "Groq_TOKEN"],
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "openrouter" => Ok(Self::OpenRouter),
            "groq" => Ok(Self::Groq),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key, environment used when empty
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let (model, endpoint) = match provider_type {
            TranslationProvider::OpenRouter => (default_openrouter_model(), default_openrouter_endpoint()),
            TranslationProvider::Groq => (default_groq_model(), default_groq_endpoint()),
            TranslationProvider::Auto => (String::new(), String::new()),
        };
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default, alias = "providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum completion tokens per sentence
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sentences translated concurrently
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

/// Speech synthesis engine selection
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisEngine {
    // @engine: External voice-cloning command, one reference per speaker
    #[default]
    Command,
    // @engine: Google Cloud Text-to-Speech with a stock voice
    Google,
}

impl SynthesisEngine {
    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Command => "command".to_string(),
            Self::Google => "google".to_string(),
        }
    }
}

impl std::fmt::Display for SynthesisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

/// Speech synthesis engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Engine used for every sentence
    #[serde(default)]
    pub engine: SynthesisEngine,

    /// Engine executable
    #[serde(default = "default_synthesis_command")]
    pub command: String,

    /// Engine arguments. Placeholders: {text}, {language}, {speaker_wav},
    /// {voice}, {gender}, {emotion}, {speed}, {output}
    #[serde(default = "default_synthesis_args")]
    pub args: Vec<String>,

    /// Google Cloud Text-to-Speech settings
    #[serde(default)]
    pub google: GoogleTtsConfig,

    /// Speed factor handed to the engine
    #[serde(default = "default_synthesis_speed")]
    pub speed: f64,

    /// Artifact tail trimmed from every clip
    #[serde(default = "default_tail_trim_ms")]
    pub tail_trim_ms: u64,

    /// Per-sentence time budget
    #[serde(default = "default_synthesis_timeout_secs")]
    pub timeout_secs: u64,

    /// Sentences synthesized concurrently
    #[serde(default = "default_synthesis_concurrency")]
    pub concurrent_requests: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            engine: SynthesisEngine::default(),
            command: default_synthesis_command(),
            args: default_synthesis_args(),
            google: GoogleTtsConfig::default(),
            speed: default_synthesis_speed(),
            tail_trim_ms: default_tail_trim_ms(),
            timeout_secs: default_synthesis_timeout_secs(),
            concurrent_requests: default_synthesis_concurrency(),
        }
    }
}

/// Google Cloud Text-to-Speech configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GoogleTtsConfig {
    // @field: API key, GOOGLE_TTS_API_KEY / GOOGLE_API_KEY used when empty
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: API base URL
    #[serde(default = "default_google_tts_endpoint")]
    pub endpoint: String,

    // @field: Stock voice name, e.g. fr-FR-Wavenet-A; gender picks one when absent
    #[serde(default)]
    pub voice_name: Option<String>,

    // @field: MALE, FEMALE or NEUTRAL
    #[serde(default)]
    pub gender: Gender,

    // @field: Pitch in semitones (-20 to 20)
    #[serde(default)]
    pub pitch: f64,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GoogleTtsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_google_tts_endpoint(),
            voice_name: None,
            gender: Gender::default(),
            pitch: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GoogleTtsConfig {
    /// Configured key, or the first non-empty environment variable
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        Self::api_key_env_vars()
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    // @returns: Environment variables holding the API key
    pub fn api_key_env_vars() -> &'static [&'static str] {
        &["GOOGLE_TTS_API_KEY", "GOOGLE_API_KEY"]
    }

    /// Stock voice every sentence is spoken with
    pub fn voice(&self) -> Voice {
        Voice::Params {
            name: self.voice_name.clone().filter(|name| !name.trim().is_empty()),
            gender: self.gender,
        }
    }
}

/// Timing policy configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimingConfig {
    /// Cap on silence a sentence may borrow
    #[serde(default = "default_silence_cap_secs")]
    pub silence_cap_secs: f64,

    /// Slot/clip ratio at or below which speech is dropped
    #[serde(default = "default_stretch_floor")]
    pub stretch_floor: f64,

    /// Diarization turns at or below this length are ignored
    #[serde(default = "default_min_turn_secs")]
    pub min_turn_secs: f64,

    /// Output sample rate
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Speaker used when no diarization turn survives filtering
    #[serde(default = "default_fallback_speaker")]
    pub fallback_speaker: String,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            silence_cap_secs: default_silence_cap_secs(),
            stretch_floor: default_stretch_floor(),
            min_turn_secs: default_min_turn_secs(),
            sample_rate: default_sample_rate(),
            fallback_speaker: default_fallback_speaker(),
        }
    }
}

/// Tempo stretch tool configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TempoConfig {
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Per-clip time budget
    #[serde(default = "default_tempo_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            timeout_secs: default_tempo_timeout_secs(),
        }
    }
}

/// External emotion classifier configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmotionConfig {
    /// Classifier executable
    pub command: String,

    /// Arguments. Placeholder: {audio}
    #[serde(default)]
    pub args: Vec<String>,

    /// Per-sentence time budget
    #[serde(default = "default_emotion_timeout_secs")]
    pub timeout_secs: u64,

    /// Sentences classified concurrently
    #[serde(default = "default_emotion_concurrency")]
    pub concurrent_requests: usize,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    500
}

fn default_openrouter_endpoint() -> String {
    crate::providers::openai_compat::OPENROUTER_ENDPOINT.to_string()
}

fn default_groq_endpoint() -> String {
    crate::providers::openai_compat::GROQ_ENDPOINT.to_string()
}

fn default_openrouter_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_groq_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_google_tts_endpoint() -> String {
    crate::synthesis::google::GOOGLE_TTS_ENDPOINT.to_string()
}

fn default_synthesis_command() -> String {
    "tts".to_string()
}

fn default_synthesis_args() -> Vec<String> {
    [
        "--model_name",
        "tts_models/multilingual/multi-dataset/xtts_v2",
        "--text",
        "{text}",
        "--language_idx",
        "{language}",
        "--speaker_wav",
        "{speaker_wav}",
        "--speed",
        "{speed}",
        "--out_path",
        "{output}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_synthesis_speed() -> f64 {
    2.0
}

fn default_tail_trim_ms() -> u64 {
    DEFAULT_TAIL_TRIM_MS
}

fn default_synthesis_timeout_secs() -> u64 {
    120
}

fn default_synthesis_concurrency() -> usize {
    2
}

fn default_silence_cap_secs() -> f64 {
    DEFAULT_SILENCE_CAP_SECS
}

fn default_stretch_floor() -> f64 {
    DEFAULT_STRETCH_FLOOR
}

fn default_min_turn_secs() -> f64 {
    DEFAULT_MIN_TURN_SECS
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_fallback_speaker() -> String {
    DEFAULT_FALLBACK_SPEAKER.to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_tempo_timeout_secs() -> u64 {
    60
}

fn default_emotion_timeout_secs() -> u64 {
    30
}

fn default_emotion_concurrency() -> usize {
    2
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        let timing = &self.timing;
        if timing.silence_cap_secs.is_nan() || timing.silence_cap_secs < 0.0 {
            return Err(anyhow!("timing.silence_cap_secs must be non-negative"));
        }
        if timing.stretch_floor.is_nan() || timing.stretch_floor <= 0.0 || timing.stretch_floor >= 1.0 {
            return Err(anyhow!("timing.stretch_floor must be between 0 and 1"));
        }
        if timing.sample_rate == 0 {
            return Err(anyhow!("timing.sample_rate must be positive"));
        }
        if self.synthesis.speed.is_nan() || self.synthesis.speed <= 0.0 {
            return Err(anyhow!("synthesis.speed must be positive"));
        }
        match self.synthesis.engine {
            SynthesisEngine::Command => {
                if self.synthesis.command.trim().is_empty() {
                    return Err(anyhow!("synthesis.command is required"));
                }
            }
            SynthesisEngine::Google => {
                let google = &self.synthesis.google;
                url::Url::parse(&google.endpoint)
                    .map_err(|e| anyhow!("Invalid synthesis.google.endpoint: {} ({})", google.endpoint, e))?;
                if google.pitch.is_nan() || !(-20.0..=20.0).contains(&google.pitch) {
                    return Err(anyhow!("synthesis.google.pitch must be between -20 and 20"));
                }
                if google.get_api_key().is_empty() {
                    return Err(anyhow!(
                        "Google TTS API key is required (set synthesis.google.api_key or {})",
                        GoogleTtsConfig::api_key_env_vars().join(" / ")
                    ));
                }
            }
        }
        if self.synthesis.concurrent_requests == 0
            || self.translation.concurrent_requests == 0
            || self.emotion_concurrency() == 0
        {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }

        for provider in &self.translation.available_providers {
            if !provider.endpoint.is_empty() {
                url::Url::parse(&provider.endpoint).map_err(|e| {
                    anyhow!("Invalid endpoint for {} provider: {} ({})", provider.provider_type, provider.endpoint, e)
                })?;
            }
        }

        // An explicitly selected provider needs a key; auto skips missing ones
        if self.translation.provider != TranslationProvider::Auto
            && self.translation.get_api_key(&self.translation.provider).is_empty()
        {
            return Err(anyhow!(
                "Translation API key is required for {} provider (set it in the config or {})",
                self.translation.provider.display_name(),
                self.translation.provider.api_key_env_vars().join(" / ")
            ));
        }

        Ok(())
    }

    /// Sentences classified concurrently, independent of translation
    pub fn emotion_concurrency(&self) -> usize {
        self.emotion
            .as_ref()
            .map(|emotion| emotion.concurrent_requests)
            .unwrap_or_else(default_emotion_concurrency)
    }

    /// Timing policy for the reconciler
    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            stretch_floor: self.timing.stretch_floor,
            silence_cap_secs: self.timing.silence_cap_secs,
            tail_trim_ms: self.synthesis.tail_trim_ms,
            sample_rate: self.timing.sample_rate,
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "fr".to_string(),
            translation: TranslationConfig::default(),
            synthesis: SynthesisConfig::default(),
            timing: TimingConfig::default(),
            tempo: TempoConfig::default(),
            emotion: None,
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for a provider
    pub fn get_model(&self, provider_type: &TranslationProvider) -> String {
        if let Some(provider_config) = self.get_provider_config(provider_type) {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }
        ProviderConfig::new(provider_type.clone()).model
    }

    /// Get the API key for a provider, falling back to its environment variables
    pub fn get_api_key(&self, provider_type: &TranslationProvider) -> String {
        if let Some(provider_config) = self.get_provider_config(provider_type) {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        provider_type
            .api_key_env_vars()
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty())
            .unwrap_or_default()
    }

    /// Get the endpoint for a provider
    pub fn get_endpoint(&self, provider_type: &TranslationProvider) -> String {
        if let Some(provider_config) = self.get_provider_config(provider_type) {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }
        ProviderConfig::new(provider_type.clone()).endpoint
    }

    /// Get the timeout for a provider
    pub fn get_timeout_secs(&self, provider_type: &TranslationProvider) -> u64 {
        self.get_provider_config(provider_type)
            .map(|p| p.timeout_secs)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::OpenRouter),
                ProviderConfig::new(TranslationProvider::Groq),
            ],
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}
