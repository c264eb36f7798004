/*!
 * Final track assembly.
 *
 * Leading silence, then every reconciled chunk in sentence order, then a
 * closing pad of `|source_duration - last_sentence_end|` seconds.
 */

use log::{debug, info, warn};
use serde::Serialize;

use crate::audio::AudioClip;
use crate::errors::TimelineError;
use crate::timeline::reconciler::ReconciledTimeline;

/// Numbers describing an assembled track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssemblyReport {
    pub leading_silence: f64,
    pub closing_silence: f64,
    /// Duration of the assembled track
    pub track_duration: f64,
    /// Duration of the source media
    pub source_duration: f64,
    /// `track_duration - source_duration`
    pub drift: f64,
}

/// The dubbed vocal track.
#[derive(Debug, Clone)]
pub struct AssembledTrack {
    pub audio: AudioClip,
    pub report: AssemblyReport,
}

/// Concatenates reconciled chunks into one continuous buffer.
#[derive(Debug, Clone, Copy)]
pub struct TrackAssembler {
    source_duration: f64,
}

impl TrackAssembler {
    pub fn new(source_duration: f64) -> Self {
        Self { source_duration }
    }

    /// Build the track. `last_end` is the end of the last sentence on the
    /// source timeline.
    pub fn assemble(
        &self,
        timeline: &ReconciledTimeline,
        last_end: f64,
    ) -> Result<AssembledTrack, TimelineError> {
        if timeline.chunks.is_empty() {
            return Err(TimelineError::NoSentences);
        }

        let rate = timeline.sample_rate;
        let closing_silence = (self.source_duration - last_end).abs();
        if last_end > self.source_duration {
            // abs() keeps the pad positive, which lengthens the track further
            warn!(
                "Last sentence ends at {:.3}s, past the source duration {:.3}s",
                last_end, self.source_duration
            );
        }

        let mut audio = AudioClip::silence(timeline.leading_silence, rate);
        for chunk in &timeline.chunks {
            audio.append(&chunk.audio);
        }
        audio.append_silence(closing_silence);

        let track_duration = audio.duration_secs();
        let report = AssemblyReport {
            leading_silence: timeline.leading_silence,
            closing_silence,
            track_duration,
            source_duration: self.source_duration,
            drift: track_duration - self.source_duration,
        };

        debug!("Assembly: {:?}", report);
        info!(
            "Assembled {:.2}s track for {:.2}s source (drift {:+.3}s)",
            track_duration, self.source_duration, report.drift
        );

        Ok(AssembledTrack { audio, report })
    }
}
