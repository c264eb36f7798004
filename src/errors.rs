/*!
 * Error types for the dubline application.
 *
 * This module contains custom error types for the different parts of the
 * dubbing pipeline, using the thiserror crate for ergonomic error definitions.
 * Only `TimelineError` is fatal to a run; the other per-sentence errors are
 * converted to degraded output (silence or source text) by their callers.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider answered but produced no usable text
    #[error("Empty response from provider: {0}")]
    EmptyResponse(String),

    /// No provider is configured for the requested selection
    #[error("No translation provider available: {0}")]
    Unavailable(String),
}

/// Fatal errors in the timeline core: malformed core input
#[derive(Error, Debug, PartialEq)]
pub enum TimelineError {
    /// No words, or the splitter produced no sentences
    #[error("Transcript is empty: {0}")]
    EmptyTranscript(String),

    /// A sentence could not be mapped back to any word timestamp
    #[error("Sentence {index} has no matching word timestamps: {text:?}")]
    UnmatchedSentence {
        /// Position of the sentence in transcript order
        index: usize,
        /// The sentence text
        text: String,
    },

    /// Nothing to reconcile or assemble
    #[error("No sentences to reconcile")]
    NoSentences,

    /// Number of synthesized clips does not match the number of sentences
    #[error("Expected {expected} synthesized clips, got {actual}")]
    ClipCountMismatch {
        /// Sentence count
        expected: usize,
        /// Clip count
        actual: usize,
    },
}

/// Errors from audio buffers and WAV files
#[derive(Error, Debug)]
pub enum AudioError {
    /// WAV container could not be read or written
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// WAV layout this crate does not handle
    #[error("Unsupported WAV format: {0}")]
    UnsupportedFormat(String),

    /// Underlying I/O failure
    #[error("Audio I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the tempo-stretch collaborator
#[derive(Error, Debug)]
pub enum StretchError {
    /// Speed factor outside what the tool can do
    #[error("Invalid speed factor: {0}")]
    InvalidSpeed(f64),

    /// The tool could not be started
    #[error("Failed to launch tempo tool: {0}")]
    Launch(String),

    /// The tool exited with a non-zero status
    #[error("Tempo tool failed: {0}")]
    ToolFailed(String),

    /// The tool exceeded its time budget
    #[error("Tempo tool timed out after {0} seconds")]
    Timeout(u64),

    /// Reading or writing the intermediate audio failed
    #[error("Tempo audio error: {0}")]
    Audio(#[from] AudioError),
}

/// Failures of the speech-synthesis collaborator
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The engine could not be started
    #[error("Failed to launch synthesis engine: {0}")]
    Launch(String),

    /// The engine exited with a non-zero status
    #[error("Synthesis engine failed: {0}")]
    EngineFailed(String),

    /// The engine exceeded its time budget
    #[error("Synthesis timed out after {0} seconds")]
    Timeout(u64),

    /// The engine finished but produced no audio
    #[error("Synthesis produced no audio: {0}")]
    NoOutput(String),

    /// A synthesis service could not be reached
    #[error("Synthesis request failed: {0}")]
    Request(String),

    /// A synthesis service rejected the request
    #[error("Synthesis API error ({status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Reading the produced audio failed
    #[error("Synthesis audio error: {0}")]
    Audio(#[from] AudioError),
}

/// Failures of the emotion-classifier collaborator
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The classifier could not be started
    #[error("Failed to launch emotion classifier: {0}")]
    Launch(String),

    /// The classifier exited with a non-zero status
    #[error("Emotion classifier failed: {0}")]
    Failed(String),

    /// The classifier exceeded its time budget
    #[error("Emotion classifier timed out after {0} seconds")]
    Timeout(u64),

    /// The classifier printed something that is not a known label
    #[error("Unknown emotion label: {0:?}")]
    UnknownLabel(String),

    /// Writing the audio slice failed
    #[error("Classifier audio error: {0}")]
    Audio(#[from] AudioError),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the timeline core
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// Error from audio handling
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
