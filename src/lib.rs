/*!
 * # dubline - time-aligned dubbing tracks
 *
 * A Rust library that turns a word-level transcript and speaker turns into a
 * dubbed vocal track in another language, aligned to the source video.
 *
 * ## Features
 *
 * - Sentence segmentation of word timestamps
 * - Speaker attribution from diarization turns
 * - Context-aware translation through OpenAI-compatible chat APIs:
 *   - OpenRouter
 *   - Groq
 * - Voice-cloning synthesis through an external engine
 * - Stretch/drop/pad timing reconciliation with a bounded silence budget
 * - Final alignment to the source duration
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Pipeline orchestration
 * - `timeline`: Segmentation, attribution, silence budget, reconciliation, assembly
 * - `audio`: PCM clips, WAV I/O and tempo stretching
 * - `input`: Transcript and diarization loaders
 * - `translation`: Sentence translation with provider fallback
 * - `providers`: Chat completion clients
 * - `synthesis`: Speech synthesis and speaker references
 * - `emotion`: Optional emotion classification
 * - `media`: Audio extraction from video
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod emotion;
pub mod errors;
pub mod file_utils;
pub mod input;
pub mod language_utils;
pub mod media;
pub mod providers;
pub mod synthesis;
pub mod timeline;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Collaborators, Controller, DubJob, RunReport};
pub use audio::AudioClip;
pub use timeline::{SentenceRecord, TimingReconciler, TrackAssembler};
pub use translation::TranslationService;
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, ProviderError, SynthesisError, TimelineError, TranslationError};
