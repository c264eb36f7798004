/*!
 * External-program speech synthesis.
 *
 * The engine is any command line that reads its inputs from arguments and
 * writes a WAV file. Argument templates may use `{text}`, `{language}`,
 * `{speaker_wav}`, `{voice}`, `{gender}`, `{emotion}`, `{speed}` and
 * `{output}`. Voice placeholders the request does not carry expand to "".
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use tokio::process::Command;

use crate::app_config::SynthesisConfig;
use crate::audio::{read_wav, AudioClip};
use crate::errors::SynthesisError;
use crate::synthesis::{SpeechSynthesizer, SynthesisRequest, Voice};

/// Runs a synthesis engine once per sentence.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: PathBuf,
    args: Vec<String>,
    timeout_secs: u64,
    sample_rate: u32,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout_secs: u64, sample_rate: u32) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_secs,
            sample_rate,
        }
    }

    pub fn from_config(config: &SynthesisConfig, sample_rate: u32) -> Self {
        Self::new(&config.command, config.args.clone(), config.timeout_secs, sample_rate)
    }

    /// Substitute placeholders in every argument.
    pub fn expand_args(&self, request: &SynthesisRequest, output: &Path) -> Vec<String> {
        let speed = format!("{}", request.speed);
        let (speaker_wav, voice, gender) = match &request.voice {
            Voice::Reference(path) => (path.to_string_lossy().into_owned(), String::new(), ""),
            Voice::Params { name, gender } => (String::new(), name.clone().unwrap_or_default(), gender.as_str()),
        };
        let output = output.to_string_lossy();
        // Engines expect an emotion name even when none was classified
        let emotion = request.emotion.engine_label().unwrap_or("Neutral");

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{language}", &request.language)
                    .replace("{speaker_wav}", &speaker_wav)
                    .replace("{voice}", &voice)
                    .replace("{gender}", gender)
                    .replace("{emotion}", emotion)
                    .replace("{speed}", &speed)
                    .replace("{output}", &output)
                    .replace("{text}", &request.text)
            })
            .collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip, SynthesisError> {
        if request.text.trim().is_empty() {
            return Ok(AudioClip::empty(self.sample_rate));
        }

        let scratch = tempfile::tempdir().map_err(|e| SynthesisError::Audio(e.into()))?;
        let output_path = scratch.path().join("speech.wav");
        let args = self.expand_args(request, &output_path);

        debug!("Synthesizing {} chars with {:?}", request.text.chars().count(), self.program);

        let engine_future = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = engine_future => {
                result.map_err(|e| SynthesisError::Launch(format!("{:?}: {}", self.program, e)))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(SynthesisError::Timeout(self.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("Synthesis engine failed: {}", stderr.trim());
            return Err(SynthesisError::EngineFailed(format!(
                "{}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if !output_path.exists() {
            return Err(SynthesisError::NoOutput(format!("{:?} was not written", output_path)));
        }

        Ok(read_wav(&output_path, self.sample_rate)?)
    }
}
