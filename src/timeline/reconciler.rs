/*!
 * Timing reconciliation.
 *
 * For every sentence, in order, the synthesized clip is fitted to the slot the
 * sentence occupied on the source timeline, plus whatever silence credit the
 * budget carries into it:
 *
 * - `theta = slot / clip_duration` picks the regime
 * - Stretch (`floor < theta < 1`): speed the clip up into `slot + credit`
 * - Drop (`theta <= floor`): the clip is too long to stretch, use silence
 * - Pad (`theta >= 1`): prepend the credit, leave the tempo alone
 *
 * The fitted clip is then topped up with silence to its full budget, and the
 * part of the following pause the next sentence may not borrow is appended.
 * Each chunk is final once computed; drift is never pushed backwards.
 */

use log::{debug, info, warn};
use serde::Serialize;

use crate::audio::{resample, AudioClip, TempoStretcher};
use crate::errors::{SynthesisError, TimelineError};
use crate::timeline::silence::{SilenceBudget, DEFAULT_SILENCE_CAP_SECS};
use crate::timeline::types::SentenceRecord;

/// At or below this slot/clip ratio speech is dropped rather than stretched.
pub const DEFAULT_STRETCH_FLOOR: f64 = 0.44;

/// Length of the artifact tail the synthesis engine leaves on every clip.
pub const DEFAULT_TAIL_TRIM_MS: u64 = 350;

/// Default track sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Fitting regime for one sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Stretch,
    Drop,
    Pad,
}

impl Regime {
    /// Pick the regime for a slot and a (trimmed) clip duration.
    pub fn select(slot: f64, clip_duration: f64, stretch_floor: f64) -> Self {
        let theta = theta(slot, clip_duration);
        if theta >= 1.0 {
            Self::Pad
        } else if theta > stretch_floor {
            Self::Stretch
        } else {
            Self::Drop
        }
    }
}

/// Ratio of slot to clip duration. An empty clip fits anything.
pub fn theta(slot: f64, clip_duration: f64) -> f64 {
    if clip_duration <= 0.0 {
        return f64::INFINITY;
    }
    slot.max(0.0) / clip_duration
}

/// Speed factor that compresses `clip_duration` into `slot + credit`.
pub fn stretch_speed(slot: f64, credit: f64, clip_duration: f64) -> f64 {
    let target_ratio = (slot + credit) / clip_duration;
    1.0 / target_ratio
}

/// What happened to one sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Clip sped up by `speed`
    Stretched { speed: f64 },
    /// Stretch tool failed; the slot was silenced
    StretchFailed { speed: f64, reason: String },
    /// Clip too long to stretch; the slot was silenced
    Dropped,
    /// Clip fit; credit prepended as silence
    Padded,
    /// No clip was synthesized; the slot was silenced
    SynthesisFailed { reason: String },
}

impl Outcome {
    /// True when the sentence's speech is missing from the track.
    pub fn is_silenced(&self) -> bool {
        !matches!(self, Self::Stretched { .. } | Self::Padded)
    }
}

/// Tunables of the timing policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    /// Drop threshold on `theta`
    pub stretch_floor: f64,
    /// Cap on borrowable silence
    pub silence_cap_secs: f64,
    /// Artifact tail trimmed from every synthesized clip
    pub tail_trim_ms: u64,
    /// Track sample rate
    pub sample_rate: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            stretch_floor: DEFAULT_STRETCH_FLOOR,
            silence_cap_secs: DEFAULT_SILENCE_CAP_SECS,
            tail_trim_ms: DEFAULT_TAIL_TRIM_MS,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// The final audio for one sentence plus the numbers that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledChunk {
    /// Sentence position in transcript order
    pub index: usize,
    /// Regime chosen, absent when synthesis failed
    pub regime: Option<Regime>,
    pub outcome: Outcome,
    /// Original-timeline slot
    pub slot: f64,
    /// Silence credit borrowed into this sentence
    pub borrowed: f64,
    /// Trimmed synthesized clip duration
    pub clip_duration: f64,
    pub theta: f64,
    /// Duration after stretch/drop/pad, before trailing silence
    pub adjusted_duration: f64,
    /// Trailing silence appended (shortfall plus unborrowed pause)
    pub trailing_silence: f64,
    #[serde(skip)]
    pub audio: AudioClip,
}

impl ReconciledChunk {
    pub fn duration(&self) -> f64 {
        self.audio.duration_secs()
    }
}

/// Counters over a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileStats {
    pub stretched: usize,
    pub stretch_failed: usize,
    pub dropped: usize,
    pub padded: usize,
    pub synthesis_failed: usize,
}

/// Output of the reconciliation pass, ready for assembly.
#[derive(Debug, Clone)]
pub struct ReconciledTimeline {
    /// Literal silence before the first sentence
    pub leading_silence: f64,
    /// One chunk per sentence, in order
    pub chunks: Vec<ReconciledChunk>,
    pub sample_rate: u32,
}

impl ReconciledTimeline {
    pub fn stats(&self) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        for chunk in &self.chunks {
            match chunk.outcome {
                Outcome::Stretched { .. } => stats.stretched += 1,
                Outcome::StretchFailed { .. } => stats.stretch_failed += 1,
                Outcome::Dropped => stats.dropped += 1,
                Outcome::Padded => stats.padded += 1,
                Outcome::SynthesisFailed { .. } => stats.synthesis_failed += 1,
            }
        }
        stats
    }
}

/// Fitted clip for one sentence before trailing silence.
struct Fitted {
    audio: AudioClip,
    regime: Option<Regime>,
    outcome: Outcome,
    clip_duration: f64,
    theta: f64,
}

/// Sequential stretch/drop/pad pass over the sentence records.
pub struct TimingReconciler<'a> {
    config: ReconcileConfig,
    stretcher: &'a dyn TempoStretcher,
}

impl<'a> TimingReconciler<'a> {
    pub fn new(config: ReconcileConfig, stretcher: &'a dyn TempoStretcher) -> Self {
        Self { config, stretcher }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Reconcile all sentences. `clips[i]` is the synthesis result for
    /// `records[i]`, untrimmed.
    pub async fn reconcile(
        &self,
        records: &[SentenceRecord],
        clips: Vec<Result<AudioClip, SynthesisError>>,
    ) -> Result<ReconciledTimeline, TimelineError> {
        self.reconcile_with_progress(records, clips, |_, _| {}).await
    }

    /// Same as `reconcile`, reporting `(done, total)` after each sentence.
    pub async fn reconcile_with_progress(
        &self,
        records: &[SentenceRecord],
        clips: Vec<Result<AudioClip, SynthesisError>>,
        progress: impl Fn(usize, usize),
    ) -> Result<ReconciledTimeline, TimelineError> {
        if records.is_empty() {
            return Err(TimelineError::NoSentences);
        }
        if clips.len() != records.len() {
            return Err(TimelineError::ClipCountMismatch {
                expected: records.len(),
                actual: clips.len(),
            });
        }

        let (mut budget, leading_silence) =
            SilenceBudget::from_leading_gap(records[0].start, self.config.silence_cap_secs);
        debug!(
            "Leading silence {:.3}s, initial credit {:.3}s",
            leading_silence,
            budget.pending()
        );

        let total = records.len();
        let mut chunks = Vec::with_capacity(total);

        for (index, (record, clip)) in records.iter().zip(clips).enumerate() {
            let slot = record.slot();
            let borrowed = budget.pending();

            let fitted = self.fit(index, slot, borrowed, clip).await;

            let adjusted_duration = fitted.audio.duration_secs();
            let total_slot = slot + borrowed;
            let next_start = records.get(index + 1).map(|next| next.start);
            let extra = budget.advance(record.end, next_start);
            let trailing_silence = (total_slot - adjusted_duration).max(0.0) + extra;

            let mut audio = fitted.audio;
            audio.append_silence(trailing_silence);

            debug!(
                "Sentence {}: slot {:.3}s, credit {:.3}s, clip {:.3}s, theta {:.3} -> {:?}, trailing {:.3}s",
                index, slot, borrowed, fitted.clip_duration, fitted.theta, fitted.outcome, trailing_silence
            );

            chunks.push(ReconciledChunk {
                index,
                regime: fitted.regime,
                outcome: fitted.outcome,
                slot,
                borrowed,
                clip_duration: fitted.clip_duration,
                theta: fitted.theta,
                adjusted_duration,
                trailing_silence,
                audio,
            });

            progress(index + 1, total);
        }

        let timeline = ReconciledTimeline {
            leading_silence,
            chunks,
            sample_rate: self.config.sample_rate,
        };

        let stats = timeline.stats();
        info!(
            "Reconciled {} sentences: {} stretched, {} padded, {} dropped, {} stretch failures, {} synthesis failures",
            total, stats.stretched, stats.padded, stats.dropped, stats.stretch_failed, stats.synthesis_failed
        );

        Ok(timeline)
    }

    /// Fit one clip into `slot + credit` (steps 1-3 of the policy).
    async fn fit(
        &self,
        index: usize,
        slot: f64,
        credit: f64,
        clip: Result<AudioClip, SynthesisError>,
    ) -> Fitted {
        let rate = self.config.sample_rate;
        let budget_silence = || AudioClip::silence(slot + credit, rate);

        let mut clip = match clip {
            Ok(clip) => self.to_track_rate(clip),
            Err(e) => {
                warn!("Sentence {}: synthesis failed, silencing its slot: {}", index, e);
                return Fitted {
                    audio: budget_silence(),
                    regime: None,
                    outcome: Outcome::SynthesisFailed {
                        reason: e.to_string(),
                    },
                    clip_duration: 0.0,
                    theta: 0.0,
                };
            }
        };

        clip.trim_tail(self.config.tail_trim_ms);
        let clip_duration = clip.duration_secs();
        let theta = theta(slot, clip_duration);
        let regime = Regime::select(slot, clip_duration, self.config.stretch_floor);

        let (audio, outcome) = match regime {
            Regime::Stretch => {
                let speed = stretch_speed(slot, credit, clip_duration);
                match self.stretcher.stretch(&clip, speed).await {
                    Ok(stretched) => (self.to_track_rate(stretched), Outcome::Stretched { speed }),
                    Err(e) => {
                        warn!(
                            "Sentence {}: tempo change x{:.3} failed, silencing its slot: {}",
                            index, speed, e
                        );
                        (
                            budget_silence(),
                            Outcome::StretchFailed {
                                speed,
                                reason: e.to_string(),
                            },
                        )
                    }
                }
            }
            Regime::Drop => {
                debug!(
                    "Sentence {}: clip {:.3}s too long for slot {:.3}s, dropping speech",
                    index, clip_duration, slot
                );
                (budget_silence(), Outcome::Dropped)
            }
            Regime::Pad => (clip.with_leading_silence(credit), Outcome::Padded),
        };

        Fitted {
            audio,
            regime: Some(regime),
            outcome,
            clip_duration,
            theta,
        }
    }

    fn to_track_rate(&self, clip: AudioClip) -> AudioClip {
        let rate = self.config.sample_rate;
        if clip.sample_rate() == rate {
            return clip;
        }
        let from = clip.sample_rate();
        AudioClip::new(resample(clip.samples(), from, rate), rate)
    }
}
