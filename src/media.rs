/*!
 * Source media handling.
 *
 * The source video's audio is extracted once, as mono PCM at the track
 * sample rate. It feeds the speaker references and the emotion slices, and
 * its duration is the length the dubbed track is aligned to.
 */

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info};
use tokio::process::Command;

use crate::audio::{read_wav, AudioClip};

/// Extracts audio from media files with ffmpeg.
#[derive(Debug, Clone)]
pub struct MediaExtractor {
    ffmpeg_path: PathBuf,
    timeout_secs: u64,
}

impl MediaExtractor {
    pub fn new(ffmpeg_path: impl Into<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout_secs,
        }
    }

    /// Extract the first audio stream of `media` to `output` as 16-bit mono
    /// WAV at `sample_rate`, and load it.
    pub async fn extract_audio<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        media: P1,
        output: P2,
        sample_rate: u32,
    ) -> Result<AudioClip> {
        let media = media.as_ref();
        let output = output.as_ref();

        if !media.exists() {
            return Err(anyhow!("Media file does not exist: {:?}", media));
        }

        let rate = sample_rate.to_string();
        let ffmpeg_future = Command::new(&self.ffmpeg_path)
            .args([
                "-y",
                "-i", media.to_str().unwrap_or_default(),
                "-vn",
                "-ac", "1",
                "-ar", &rate,
                "-acodec", "pcm_s16le",
                output.to_str().unwrap_or_default(),
            ])
            .kill_on_drop(true)
            .output();

        let timeout_duration = std::time::Duration::from_secs(self.timeout_secs);
        let result = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| anyhow!("Failed to execute ffmpeg command for audio extraction: {}", e))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(anyhow!("ffmpeg command timed out after {} seconds", self.timeout_secs));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let filtered = filter_ffmpeg_stderr(&stderr);
            error!("Audio extraction failed: {}", filtered);
            return Err(anyhow!("ffmpeg extraction failed: {}", filtered));
        }

        let clip = read_wav(output, sample_rate)
            .with_context(|| format!("Failed to read extracted audio: {:?}", output))?;
        if clip.is_empty() {
            return Err(anyhow!("No audio found in {:?}", media));
        }

        info!("Extracted {:.2}s of audio from {:?}", clip.duration_secs(), media);
        Ok(clip)
    }
}

/// Load source audio directly when the input already is a WAV file.
pub fn load_source_audio<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<AudioClip> {
    let path = path.as_ref();
    let clip = read_wav(path, sample_rate).with_context(|| format!("Failed to read audio: {:?}", path))?;
    debug!("Loaded {:.2}s of source audio from {:?}", clip.duration_secs(), path);
    Ok(clip)
}

/// True when `path` is a WAV file that can be used without extraction.
pub fn is_wav<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Drop ffmpeg's banner and stream listing, keep the actual complaint.
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        stderr.trim().to_string()
    } else {
        meaningful.join("\n")
    }
}
