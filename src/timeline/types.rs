/*!
 * Timeline data model.
 *
 * All times are seconds on the source video's timeline, as `f64`.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One recognized word with its timestamps.
///
/// `text` is kept exactly as the recognizer emitted it, leading whitespace
/// included, because the segmenter maps characters back onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl WordToken {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// A sentence of the source transcript with its time span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceSpan {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl SentenceSpan {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Original-timeline duration, never negative.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// A speaker turn reported by the diarization collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationInterval {
    pub start: f64,
    pub end: f64,
    #[serde(alias = "speaker")]
    pub speaker_id: String,
}

impl DiarizationInterval {
    pub fn new(start: f64, end: f64, speaker_id: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker_id: speaker_id.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Emotion label attached to a sentence for expressive synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Angry,
    Happy,
    Sad,
    /// Classification unavailable or failed
    #[default]
    None,
}

impl Emotion {
    /// Name handed to the synthesis engine, if any.
    pub fn engine_label(&self) -> Option<&'static str> {
        match self {
            Self::Neutral => Some("Neutral"),
            Self::Angry => Some("Angry"),
            Self::Happy => Some("Happy"),
            Self::Sad => Some("Sad"),
            Self::None => None,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Neutral => "neutral",
            Self::Angry => "angry",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::None => "none",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Emotion {
    type Err = anyhow::Error;

    /// Accepts full names and the short codes emotion classifiers print.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neu" | "neutral" => Ok(Self::Neutral),
            "ang" | "angry" => Ok(Self::Angry),
            "hap" | "happy" => Ok(Self::Happy),
            "sad" => Ok(Self::Sad),
            "none" | "" => Ok(Self::None),
            other => Err(anyhow::anyhow!("Unknown emotion label: {}", other)),
        }
    }
}

/// The unit the reconciler operates on: one translated, attributed sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub translated_text: String,
    pub source_text: String,
    pub start: f64,
    pub end: f64,
    pub speaker_id: String,
    #[serde(default)]
    pub emotion: Emotion,
}

impl SentenceRecord {
    /// Start a record from a span; translation defaults to the source text
    /// until a translation is filled in.
    pub fn from_span(span: &SentenceSpan, speaker_id: impl Into<String>) -> Self {
        Self {
            translated_text: span.text.clone(),
            source_text: span.text.clone(),
            start: span.start,
            end: span.end,
            speaker_id: speaker_id.into(),
            emotion: Emotion::None,
        }
    }

    /// The slot this sentence's dubbed speech should occupy.
    pub fn slot(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}
