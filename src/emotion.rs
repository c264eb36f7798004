/*!
 * Emotion classification of source sentences.
 *
 * The label travels with the sentence to the synthesis engine. Classification
 * is optional: when it is disabled or fails, the sentence is labelled
 * `Emotion::None`.
 */

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use tokio::process::Command;

use crate::app_config::EmotionConfig;
use crate::audio::{write_wav, AudioClip};
use crate::errors::ClassifierError;
use crate::timeline::types::{Emotion, SentenceRecord};

/// Emotion collaborator: audio slice in, label out.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, clip: &AudioClip) -> Result<Emotion, ClassifierError>;
}

/// Classifier used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClassifier;

#[async_trait]
impl EmotionClassifier for DisabledClassifier {
    async fn classify(&self, _clip: &AudioClip) -> Result<Emotion, ClassifierError> {
        Ok(Emotion::None)
    }
}

/// Runs an external classifier that prints a label such as `neu` or `hap`.
///
/// The last non-empty line of standard output is taken as the label.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: PathBuf,
    args: Vec<String>,
    timeout_secs: u64,
}

impl CommandClassifier {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_secs,
        }
    }

    pub fn from_config(config: &EmotionConfig) -> Self {
        Self::new(&config.command, config.args.clone(), config.timeout_secs)
    }

    /// Read the label from the classifier's output.
    pub fn parse_label(stdout: &str) -> Result<Emotion, ClassifierError> {
        let line = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .unwrap_or_default();
        line.parse::<Emotion>()
            .map_err(|_| ClassifierError::UnknownLabel(line.to_string()))
    }
}

#[async_trait]
impl EmotionClassifier for CommandClassifier {
    async fn classify(&self, clip: &AudioClip) -> Result<Emotion, ClassifierError> {
        let scratch = tempfile::tempdir().map_err(|e| ClassifierError::Audio(e.into()))?;
        let audio_path = scratch.path().join("sentence.wav");
        write_wav(&audio_path, clip)?;

        let audio = audio_path.to_string_lossy();
        let args: Vec<String> = self.args.iter().map(|a| a.replace("{audio}", &audio)).collect();

        let classifier_future = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = classifier_future => {
                result.map_err(|e| ClassifierError::Launch(format!("{:?}: {}", self.program, e)))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(ClassifierError::Timeout(self.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClassifierError::Failed(stderr.trim().to_string()));
        }

        Self::parse_label(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Label every record from its slice of the source audio.
///
/// Failures leave the record at `Emotion::None`.
pub async fn classify_records(
    classifier: &dyn EmotionClassifier,
    source: &AudioClip,
    records: &mut [SentenceRecord],
    concurrency: usize,
) {
    let slices: Vec<AudioClip> = records
        .iter()
        .map(|record| source.slice(record.start, record.end))
        .collect();

    let mut results = stream::iter(slices.iter().map(|slice| classifier.classify(slice)))
        .buffered(concurrency.max(1))
        .enumerate();

    while let Some((index, result)) = results.next().await {
        records[index].emotion = match result {
            Ok(emotion) => {
                debug!("Sentence {}: emotion {}", index, emotion);
                emotion
            }
            Err(e) => {
                warn!("Sentence {}: emotion classification failed: {}", index, e);
                Emotion::None
            }
        };
    }
}
