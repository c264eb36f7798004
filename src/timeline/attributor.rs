/*!
 * Speaker attribution for sentence spans.
 *
 * Each sentence goes to the diarized speaker whose turn overlaps it the most.
 * Turns shorter than the minimum duration are discarded as noise before
 * anything else happens. Sentences that overlap no turn at all go to the
 * speaker with the most turns in the whole video.
 */

use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;

use crate::timeline::types::{DiarizationInterval, SentenceSpan};

/// Turns at or below this length are treated as diarization noise.
pub const DEFAULT_MIN_TURN_SECS: f64 = 1.5;

/// Label used when diarization yields no usable turn at all.
pub const DEFAULT_FALLBACK_SPEAKER: &str = "SPEAKER_00";

/// Overlap in seconds between `[a_start, a_end]` and `[b_start, b_end]`.
pub fn overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0.0)
}

/// How a sentence got its speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    /// Best-overlapping turn, by index into the filtered turns
    Overlap(usize),
    /// No overlap; the video-wide most frequent speaker
    GlobalMode,
    /// No usable diarization; the configured fallback label
    Fallback,
}

/// Attribution statistics for logging and reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributionStats {
    /// Turns received
    pub intervals_received: usize,
    /// Turns kept after the duration filter
    pub intervals_kept: usize,
    /// Sentences attributed by overlap
    pub by_overlap: usize,
    /// Sentences attributed to the global mode speaker
    pub by_mode: usize,
    /// Sentences attributed to the fallback label
    pub by_fallback: usize,
}

/// Assigns diarized speakers to sentence spans.
#[derive(Debug, Clone)]
pub struct SpeakerAttributor {
    intervals: Vec<DiarizationInterval>,
    mode_speaker: Option<String>,
    fallback_speaker: String,
    intervals_received: usize,
}

impl SpeakerAttributor {
    /// Build an attributor with the default turn filter and fallback label.
    pub fn new(intervals: Vec<DiarizationInterval>) -> Self {
        Self::with_settings(intervals, DEFAULT_MIN_TURN_SECS, DEFAULT_FALLBACK_SPEAKER)
    }

    /// Build an attributor keeping only turns longer than `min_turn_secs`.
    pub fn with_settings(
        intervals: Vec<DiarizationInterval>,
        min_turn_secs: f64,
        fallback_speaker: impl Into<String>,
    ) -> Self {
        let intervals_received = intervals.len();
        let intervals: Vec<DiarizationInterval> = intervals
            .into_iter()
            .filter(|i| i.duration() > min_turn_secs)
            .collect();

        if intervals.len() < intervals_received {
            debug!(
                "Discarded {} diarization turns of {}s or less",
                intervals_received - intervals.len(),
                min_turn_secs
            );
        }

        let mode_speaker = mode_speaker(&intervals);
        Self {
            intervals,
            mode_speaker,
            fallback_speaker: fallback_speaker.into(),
            intervals_received,
        }
    }

    /// Turns that survived the duration filter, in input order.
    pub fn intervals(&self) -> &[DiarizationInterval] {
        &self.intervals
    }

    /// Speaker with the most turns, ties going to the first one seen.
    pub fn mode_speaker(&self) -> Option<&str> {
        self.mode_speaker.as_deref()
    }

    /// Pick the speaker for one sentence.
    pub fn attribute(&self, span: &SentenceSpan) -> (String, Attribution) {
        let mut best: Option<(usize, f64)> = None;

        for (idx, interval) in self.intervals.iter().enumerate() {
            let amount = overlap(span.start, span.end, interval.start, interval.end);
            let current_best = best.map(|(_, o)| o).unwrap_or(0.0);
            if amount > current_best {
                best = Some((idx, amount));
            }
        }

        if let Some((idx, _)) = best {
            return (self.intervals[idx].speaker_id.clone(), Attribution::Overlap(idx));
        }

        match &self.mode_speaker {
            Some(speaker) => (speaker.clone(), Attribution::GlobalMode),
            None => (self.fallback_speaker.clone(), Attribution::Fallback),
        }
    }

    /// Attribute every span, in order.
    pub fn attribute_all(&self, spans: &[SentenceSpan]) -> (Vec<String>, AttributionStats) {
        let mut stats = AttributionStats {
            intervals_received: self.intervals_received,
            intervals_kept: self.intervals.len(),
            ..Default::default()
        };

        if self.mode_speaker.is_none() {
            warn!(
                "No diarization turn longer than the minimum; every sentence goes to {}",
                self.fallback_speaker
            );
        }

        let speakers = spans
            .iter()
            .map(|span| {
                let (speaker, how) = self.attribute(span);
                match how {
                    Attribution::Overlap(_) => stats.by_overlap += 1,
                    Attribution::GlobalMode => stats.by_mode += 1,
                    Attribution::Fallback => stats.by_fallback += 1,
                }
                speaker
            })
            .collect();

        (speakers, stats)
    }
}

/// Most frequent speaker label by turn count; first seen wins ties.
fn mode_speaker(intervals: &[DiarizationInterval]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for interval in intervals {
        let count = counts.entry(interval.speaker_id.as_str()).or_insert(0);
        if *count == 0 {
            order.push(interval.speaker_id.as_str());
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for speaker in order {
        let count = counts[speaker];
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((speaker, count));
        }
    }
    best.map(|(speaker, _)| speaker.to_string())
}
