/*!
 * Audio buffers and audio-level collaborators.
 *
 * - `clip`: in-memory mono PCM clips and silence
 * - `wav`: WAV reading/writing, downmixing and resampling
 * - `tempo`: pitch-preserving tempo change (ffmpeg `atempo`)
 */

pub mod clip;
pub mod tempo;
pub mod wav;

pub use self::clip::{seconds_to_samples, AudioClip, ClipSummary};
pub use self::tempo::{FfmpegTempo, TempoStretcher};
pub use self::wav::{read_wav, read_wav_from, resample, write_wav, write_wav_to};
