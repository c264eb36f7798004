/*!
 * Speech synthesis collaborator.
 *
 * - `command`: runs an external voice-cloning engine per sentence
 * - `google`: Google Cloud Text-to-Speech, voiced from voice parameters
 * - `references`: per-speaker reference audio the cloning engine clones from
 *
 * Synthesis is independent per sentence, so it runs ahead of reconciliation
 * with bounded concurrency. Results stay in sentence order and failures are
 * handed on as `Err` for the reconciler to silence.
 */

use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::audio::AudioClip;
use crate::errors::SynthesisError;
use crate::timeline::types::{Emotion, SentenceRecord};

pub mod command;
pub mod google;
pub mod references;

pub use self::command::CommandSynthesizer;
pub use self::google::GoogleTtsSynthesizer;
pub use self::references::SpeakerReferences;

/// Voice gender requested from engines that pick a stock voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Neutral,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Neutral => "NEUTRAL",
        }
    }
}

/// How a sentence should be voiced
#[derive(Debug, Clone, PartialEq)]
pub enum Voice {
    /// Clone the voice in this reference recording
    Reference(PathBuf),
    /// Stock voice, by name or else by gender
    Params { name: Option<String>, gender: Gender },
}

impl Voice {
    /// Reference recording, when the voice is cloned
    pub fn reference(&self) -> Option<&PathBuf> {
        match self {
            Self::Reference(path) => Some(path),
            Self::Params { .. } => None,
        }
    }
}

/// Everything the engine needs for one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    /// Text to speak, in the target language
    pub text: String,
    /// Engine language code
    pub language: String,
    pub voice: Voice,
    pub emotion: Emotion,
    /// Speaking speed factor
    pub speed: f64,
}

/// Text-to-speech collaborator.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one sentence. The clip is returned untrimmed.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip, SynthesisError>;
}

/// One request per record, voiced by `voice_for(speaker_id)`.
pub fn build_requests(
    records: &[SentenceRecord],
    language: &str,
    voice_for: impl Fn(&str) -> Voice,
    speed: f64,
) -> Vec<SynthesisRequest> {
    records
        .iter()
        .map(|record| SynthesisRequest {
            text: record.translated_text.clone(),
            language: language.to_string(),
            voice: voice_for(&record.speaker_id),
            emotion: record.emotion,
            speed,
        })
        .collect()
}

/// Synthesize all requests, `concurrency` at a time, preserving order.
pub async fn synthesize_all(
    synthesizer: &dyn SpeechSynthesizer,
    requests: &[SynthesisRequest],
    concurrency: usize,
    progress: impl Fn(usize, usize),
) -> Vec<Result<AudioClip, SynthesisError>> {
    let total = requests.len();
    let mut results = Vec::with_capacity(total);

    let mut stream = stream::iter(requests.iter().map(|request| synthesizer.synthesize(request)))
        .buffered(concurrency.max(1));

    while let Some(result) = stream.next().await {
        if let Err(e) = &result {
            warn!("Sentence {}: synthesis failed: {}", results.len(), e);
        }
        results.push(result);
        progress(results.len(), total);
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!("Synthesized {} sentences ({} failed)", total - failed, failed);
    results
}
