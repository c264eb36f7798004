/*!
 * Google Cloud Text-to-Speech.
 *
 * Speaks every sentence with a stock voice picked by name or gender instead
 * of cloning the speaker. Audio comes back as base64 LINEAR16 WAV at the
 * track rate. Emotion is not supported by the service and is ignored.
 */

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::GoogleTtsConfig;
use crate::audio::{read_wav_from, AudioClip};
use crate::errors::SynthesisError;
use crate::synthesis::{Gender, SpeechSynthesizer, SynthesisRequest, Voice};

/// Default Text-to-Speech API base
pub const GOOGLE_TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1";

/// Language used when a code has no Google voice mapping
pub const DEFAULT_GOOGLE_LANGUAGE: &str = "en-US";

/// Engine language code to Google voice language
const GOOGLE_LANGUAGES: &[(&str, &str)] = &[
    ("en", "en-US"),
    ("es", "es-ES"),
    ("fr", "fr-FR"),
    ("de", "de-DE"),
    ("it", "it-IT"),
    ("tr", "tr-TR"),
    ("ru", "ru-RU"),
    ("nl", "nl-NL"),
    ("cs", "cs-CZ"),
    ("ar", "ar-XA"),
    ("zh-cn", "zh-CN"),
    ("ja", "ja-JP"),
    ("ko", "ko-KR"),
    ("hi", "hi-IN"),
    ("hu", "hu-HU"),
];

/// Google voice language for an engine language code, if one is known
pub fn google_language_code(code: &str) -> Option<&'static str> {
    let code = code.trim().to_lowercase();
    GOOGLE_LANGUAGES
        .iter()
        .find(|(engine, _)| *engine == code)
        .map(|(_, google)| *google)
}

/// `text:synthesize` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeBody {
    input: SynthesisInput,
    voice: VoiceSelection,
    audio_config: AudioConfig,
}

#[derive(Debug, Clone, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssml_gender: Option<Gender>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f64,
    pitch: f64,
    sample_rate_hertz: u32,
}

/// `text:synthesize` response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeResponse {
    #[serde(default)]
    pub audio_content: String,
}

/// Client for the Google Cloud Text-to-Speech REST API
#[derive(Debug, Clone)]
pub struct GoogleTtsSynthesizer {
    client: Client,
    api_key: String,
    endpoint: String,
    pitch: f64,
    timeout_secs: u64,
    sample_rate: u32,
}

impl GoogleTtsSynthesizer {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64, sample_rate: u32) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            pitch: 0.0,
            timeout_secs,
            sample_rate,
        }
    }

    pub fn from_config(config: &GoogleTtsConfig, sample_rate: u32) -> Self {
        Self::new(config.get_api_key(), &config.endpoint, config.timeout_secs, sample_rate).with_pitch(config.pitch)
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    fn api_url(&self) -> String {
        format!("{}/text:synthesize", self.endpoint.trim_end_matches('/'))
    }

    /// Request body for one sentence. A voice name wins over the gender.
    pub fn build_body(&self, request: &SynthesisRequest) -> SynthesizeBody {
        let language_code = google_language_code(&request.language)
            .unwrap_or(DEFAULT_GOOGLE_LANGUAGE)
            .to_string();

        let (name, ssml_gender) = match &request.voice {
            Voice::Params { name: Some(name), .. } => (Some(name.clone()), None),
            Voice::Params { name: None, gender } => (None, Some(*gender)),
            // Nothing to clone from here, let the service pick
            Voice::Reference(_) => (None, Some(Gender::Neutral)),
        };

        SynthesizeBody {
            input: SynthesisInput {
                text: request.text.clone(),
            },
            voice: VoiceSelection {
                language_code,
                name,
                ssml_gender,
            },
            audio_config: AudioConfig {
                audio_encoding: "LINEAR16",
                // Service accepts 0.25 to 4.0
                speaking_rate: request.speed.clamp(0.25, 4.0),
                pitch: self.pitch,
                sample_rate_hertz: self.sample_rate,
            },
        }
    }

    /// Decode the base64 WAV carried by a response
    pub fn decode_response(&self, response: &SynthesizeResponse) -> Result<AudioClip, SynthesisError> {
        if response.audio_content.is_empty() {
            return Err(SynthesisError::NoOutput("response carried no audioContent".to_string()));
        }
        let bytes = general_purpose::STANDARD
            .decode(response.audio_content.as_bytes())
            .map_err(|e| SynthesisError::NoOutput(format!("audioContent is not base64: {}", e)))?;
        Ok(read_wav_from(Cursor::new(bytes), self.sample_rate)?)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip, SynthesisError> {
        if request.text.trim().is_empty() {
            return Ok(AudioClip::empty(self.sample_rate));
        }

        let body = self.build_body(request);
        debug!(
            "Synthesizing {} chars with Google TTS ({})",
            request.text.chars().count(),
            body.voice.language_code
        );

        let response = self
            .client
            .post(self.api_url())
            .header("X-Goog-Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout(self.timeout_secs)
                } else {
                    SynthesisError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google TTS API error ({}): {}", status, error_text);
            return Err(SynthesisError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let response = response
            .json::<SynthesizeResponse>()
            .await
            .map_err(|e| SynthesisError::NoOutput(format!("unreadable response: {}", e)))?;
        self.decode_response(&response)
    }
}
