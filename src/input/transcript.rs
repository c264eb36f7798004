/*!
 * Word-level transcript loading.
 *
 * Two encodings are accepted:
 * - Whisper-style output: `{"segments": [{"words": [{"word", "start", "end"}]}]}`
 * - a flat array of `{"text" | "word", "start", "end"}`
 *
 * Word text is kept byte for byte, leading whitespace included. Words without
 * timestamps are skipped with a warning.
 */

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;

use crate::file_utils::FileManager;
use crate::timeline::types::WordToken;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranscriptDocument {
    Segmented { segments: Vec<RawSegment> },
    Flat(Vec<RawWord>),
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    #[serde(default)]
    words: Vec<RawWord>,
}

#[derive(Debug, Deserialize)]
struct RawWord {
    #[serde(alias = "word")]
    text: String,
    start: Option<f64>,
    end: Option<f64>,
}

/// Load a word-level transcript from a JSON file.
pub fn load_transcript<P: AsRef<Path>>(path: P) -> Result<Vec<WordToken>> {
    let path = path.as_ref();
    let content = FileManager::read_to_string(path)?;
    let words = parse_transcript(&content)
        .with_context(|| format!("Failed to parse transcript: {:?}", path))?;
    debug!("Loaded {} words from {:?}", words.len(), path);
    Ok(words)
}

/// Parse a word-level transcript from JSON text.
pub fn parse_transcript(content: &str) -> Result<Vec<WordToken>> {
    let document: TranscriptDocument =
        serde_json::from_str(content).context("Transcript is neither a segment list nor a word list")?;

    let raw_words: Vec<RawWord> = match document {
        TranscriptDocument::Segmented { segments } => {
            segments.into_iter().flat_map(|segment| segment.words).collect()
        }
        TranscriptDocument::Flat(words) => words,
    };

    let mut skipped = 0usize;
    let words: Vec<WordToken> = raw_words
        .into_iter()
        .filter_map(|raw| match (raw.start, raw.end) {
            (Some(start), Some(end)) => Some(WordToken::new(raw.text, start, end)),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!("Skipped {} transcript words without timestamps", skipped);
    }

    Ok(words)
}
