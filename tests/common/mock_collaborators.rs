/*!
 * Scripted collaborators for pipeline tests.
 *
 * - `MapTranslator` - looks sentences up in a table, keeps unknown ones
 * - `CharRateSynthesizer` - speech length proportional to the text
 * - `NaiveTempo` - changes tempo by dropping or repeating samples
 * - `FixedClassifier` - same emotion for every sentence
 */

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use dubline::audio::{AudioClip, TempoStretcher};
use dubline::emotion::EmotionClassifier;
use dubline::errors::{ClassifierError, StretchError, SynthesisError, TranslationError};
use dubline::synthesis::{SpeechSynthesizer, SynthesisRequest};
use dubline::timeline::Emotion;
use dubline::translation::{TranslationRequest, Translator};

/// Translator backed by a lookup table
#[derive(Debug, Default)]
pub struct MapTranslator {
    table: HashMap<String, String>,
}

impl MapTranslator {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            table: pairs
                .iter()
                .map(|(source, target)| (source.to_string(), target.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Translator for MapTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError> {
        Ok(self
            .table
            .get(&request.sentence)
            .cloned()
            .unwrap_or_else(|| request.sentence.clone()))
    }
}

/// Synthesizer speaking `seconds_per_char` per character, followed by an
/// artifact tail of `tail_secs`. Texts containing `fail_on` fail.
#[derive(Debug)]
pub struct CharRateSynthesizer {
    pub seconds_per_char: f64,
    pub tail_secs: f64,
    pub sample_rate: u32,
    pub fail_on: Option<&'static str>,
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl CharRateSynthesizer {
    pub fn new(seconds_per_char: f64, tail_secs: f64, sample_rate: u32) -> Self {
        Self {
            seconds_per_char,
            tail_secs,
            sample_rate,
            fail_on: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, marker: &'static str) -> Self {
        self.fail_on = Some(marker);
        self
    }

    /// Requests received so far, in completion order
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for CharRateSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip, SynthesisError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(marker) = self.fail_on {
            if request.text.contains(marker) {
                return Err(SynthesisError::EngineFailed(format!("scripted failure on {:?}", marker)));
            }
        }

        let speech_secs = request.text.chars().count() as f64 * self.seconds_per_char;
        let len = ((speech_secs + self.tail_secs) * self.sample_rate as f64).round() as usize;
        Ok(AudioClip::new(vec![1_000; len], self.sample_rate))
    }
}

/// Tempo change by nearest-sample picking; pitch is not preserved
#[derive(Debug, Default)]
pub struct NaiveTempo;

#[async_trait]
impl TempoStretcher for NaiveTempo {
    async fn stretch(&self, clip: &AudioClip, speed: f64) -> Result<AudioClip, StretchError> {
        if speed.is_nan() || speed <= 0.0 {
            return Err(StretchError::InvalidSpeed(speed));
        }
        let out_len = (clip.len() as f64 / speed).round() as usize;
        let samples = (0..out_len)
            .map(|i| {
                let src = ((i as f64 * speed) as usize).min(clip.len().saturating_sub(1));
                clip.samples().get(src).copied().unwrap_or(0)
            })
            .collect();
        Ok(AudioClip::new(samples, clip.sample_rate()))
    }
}

/// Tempo stretcher that always fails
#[derive(Debug, Default)]
pub struct BrokenTempo;

#[async_trait]
impl TempoStretcher for BrokenTempo {
    async fn stretch(&self, _clip: &AudioClip, _speed: f64) -> Result<AudioClip, StretchError> {
        Err(StretchError::ToolFailed("scripted failure".to_string()))
    }
}

/// Classifier returning the same label for every slice
#[derive(Debug)]
pub struct FixedClassifier(pub Emotion);

#[async_trait]
impl EmotionClassifier for FixedClassifier {
    async fn classify(&self, _clip: &AudioClip) -> Result<Emotion, ClassifierError> {
        Ok(self.0)
    }
}
