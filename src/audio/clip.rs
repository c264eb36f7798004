/*!
 * In-memory mono PCM clips.
 *
 * Every buffer that flows through the timeline is an `AudioClip`: synthesized
 * speech, silence fills, reconciled chunks and the assembled track. Durations
 * are derived from the sample count, so silence lengths are rounded to whole
 * samples.
 */

use serde::Serialize;

/// A mono 16-bit PCM buffer at a fixed sample rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    samples: Vec<i16>,
    sample_rate: u32,
}

/// Lightweight summary of a clip, for reports.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ClipSummary {
    /// Duration in seconds
    pub duration_secs: f64,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

/// Number of samples covering `seconds` at `sample_rate`. Negative and
/// non-finite durations map to zero.
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> usize {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate as f64).round() as usize
}

impl AudioClip {
    /// Wrap existing samples.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// An empty clip.
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    /// Digital silence of the given length.
    pub fn silence(seconds: f64, sample_rate: u32) -> Self {
        Self::new(vec![0; seconds_to_samples(seconds, sample_rate)], sample_rate)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Measured duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn summary(&self) -> ClipSummary {
        ClipSummary {
            duration_secs: self.duration_secs(),
            sample_rate: self.sample_rate,
        }
    }

    /// Append another clip. The other clip must share this clip's rate.
    pub fn append(&mut self, other: &AudioClip) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        self.samples.extend_from_slice(&other.samples);
    }

    /// Append `seconds` of silence.
    pub fn append_silence(&mut self, seconds: f64) {
        let count = seconds_to_samples(seconds, self.sample_rate);
        self.samples.resize(self.samples.len() + count, 0);
    }

    /// Return a copy with `seconds` of silence in front.
    pub fn with_leading_silence(&self, seconds: f64) -> Self {
        let count = seconds_to_samples(seconds, self.sample_rate);
        let mut samples = Vec::with_capacity(count + self.samples.len());
        samples.resize(count, 0);
        samples.extend_from_slice(&self.samples);
        Self::new(samples, self.sample_rate)
    }

    /// Drop the last `millis` milliseconds. Clips shorter than that become empty.
    pub fn trim_tail(&mut self, millis: u64) {
        let count = seconds_to_samples(millis as f64 / 1000.0, self.sample_rate);
        let keep = self.samples.len().saturating_sub(count);
        self.samples.truncate(keep);
    }

    /// Copy of the `[start, end)` range in seconds, clamped to the clip.
    pub fn slice(&self, start: f64, end: f64) -> Self {
        let from = seconds_to_samples(start, self.sample_rate).min(self.samples.len());
        let to = seconds_to_samples(end, self.sample_rate).min(self.samples.len());
        if to <= from {
            return Self::empty(self.sample_rate);
        }
        Self::new(self.samples[from..to].to_vec(), self.sample_rate)
    }

    /// Concatenate clips in order.
    pub fn concat<'a>(clips: impl IntoIterator<Item = &'a AudioClip>, sample_rate: u32) -> Self {
        let mut out = Self::empty(sample_rate);
        for clip in clips {
            out.append(clip);
        }
        out
    }

    /// True when every sample is zero.
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|s| *s == 0)
    }
}
