/*!
 * Loaders for the recognizer and diarizer outputs the pipeline consumes.
 */

pub mod diarization;
pub mod transcript;

pub use diarization::{load_diarization, parse_json, parse_rttm};
pub use transcript::{load_transcript, parse_transcript};
