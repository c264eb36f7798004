/*!
 * Timeline core: from word timestamps to one time-aligned dubbed track.
 *
 * Data flows strictly forward:
 * segmenter -> attributor -> reconciler (with the silence budget) -> assembler
 */

pub mod assembler;
pub mod attributor;
pub mod reconciler;
pub mod segmenter;
pub mod silence;
pub mod types;

pub use assembler::{AssembledTrack, AssemblyReport, TrackAssembler};
pub use attributor::{Attribution, AttributionStats, SpeakerAttributor};
pub use reconciler::{
    Outcome, ReconcileConfig, ReconcileStats, ReconciledChunk, ReconciledTimeline, Regime,
    TimingReconciler,
};
pub use segmenter::{PunctuationSplitter, SentenceSegmenter, SentenceSplitter};
pub use silence::{GapSplit, SilenceBudget};
pub use types::{DiarizationInterval, Emotion, SentenceRecord, SentenceSpan, WordToken};
