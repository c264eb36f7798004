/*!
 * Tempo-stretch collaborator.
 *
 * The reconciler only needs "play this clip faster by factor X, keeping the
 * pitch". `FfmpegTempo` delegates that to ffmpeg's `atempo` filter, which is
 * what the timing policy was tuned against.
 */

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use tokio::process::Command;

use crate::audio::{read_wav, write_wav, AudioClip};
use crate::errors::StretchError;

/// Smallest factor a single `atempo` stage accepts on every ffmpeg version.
const ATEMPO_MIN: f64 = 0.5;

/// Largest factor a single `atempo` stage accepts on every ffmpeg version.
const ATEMPO_MAX: f64 = 2.0;

/// Pitch-preserving tempo change.
#[async_trait]
pub trait TempoStretcher: Send + Sync {
    /// Return `clip` played `speed` times faster (`speed > 1` shortens it).
    async fn stretch(&self, clip: &AudioClip, speed: f64) -> Result<AudioClip, StretchError>;
}

/// Tempo stretcher backed by the ffmpeg `atempo` filter.
#[derive(Debug, Clone)]
pub struct FfmpegTempo {
    ffmpeg_path: PathBuf,
    timeout_secs: u64,
}

impl FfmpegTempo {
    pub fn new(ffmpeg_path: impl Into<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout_secs,
        }
    }

    /// Build the `atempo` filter chain for `speed`, splitting it into stages
    /// that each stay inside `[0.5, 2.0]`.
    pub fn filter_chain(speed: f64) -> Result<String, StretchError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(StretchError::InvalidSpeed(speed));
        }

        let mut stages = Vec::new();
        let mut remaining = speed;
        while remaining > ATEMPO_MAX {
            stages.push(ATEMPO_MAX);
            remaining /= ATEMPO_MAX;
        }
        while remaining < ATEMPO_MIN {
            stages.push(ATEMPO_MIN);
            remaining /= ATEMPO_MIN;
        }
        stages.push(remaining);

        Ok(stages
            .iter()
            .map(|s| format!("atempo={:.6}", s))
            .collect::<Vec<_>>()
            .join(","))
    }
}

#[async_trait]
impl TempoStretcher for FfmpegTempo {
    async fn stretch(&self, clip: &AudioClip, speed: f64) -> Result<AudioClip, StretchError> {
        let filter = Self::filter_chain(speed)?;

        let scratch = tempfile::tempdir().map_err(|e| StretchError::Audio(e.into()))?;
        let input_path = scratch.path().join("input.wav");
        let output_path = scratch.path().join("output.wav");
        write_wav(&input_path, clip)?;

        debug!("Running ffmpeg with filter {}", filter);

        let ffmpeg_future = Command::new(&self.ffmpeg_path)
            .args([
                "-y",
                "-loglevel", "error",
                "-i", input_path.to_str().unwrap_or_default(),
                "-filter:a", &filter,
                "-vn",
                output_path.to_str().unwrap_or_default(),
            ])
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| StretchError::Launch(e.to_string()))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(StretchError::Timeout(self.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffmpeg tempo change failed: {}", stderr.trim());
            return Err(StretchError::ToolFailed(stderr.trim().to_string()));
        }

        Ok(read_wav(&output_path, clip.sample_rate())?)
    }
}
