/*!
 * Sentence segmentation.
 *
 * Turns word-level timestamps into sentence-level spans:
 * - the concatenated transcript is split into sentences by a `SentenceSplitter`
 * - every sentence character is mapped back onto the word it came from
 * - the span runs from the earliest to the latest of those words
 *
 * The character mapping walks a single cursor over the flattened word text and
 * skips exactly one position between sentences, standing in for the separator
 * the splitter strips. When a splitter removes more or less than one character
 * between sentences, the mapping drifts by that amount. The drift is small at
 * punctuation and whitespace boundaries and is accepted as an approximation.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TimelineError;
use crate::timeline::types::{SentenceSpan, WordToken};

// @const: Sentence-final punctuation, optional closing quote/bracket, then
// whitespace or end of text. CJK full stops need no trailing whitespace.
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:[.!?…]+["'”’)\]]*(?:\s+|$))|(?:[。！？]+\s*)"#)
        .expect("Invalid sentence boundary regex")
});

/// Abbreviations that end in a period without ending the sentence.
const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "sr.", "jr.", "st.", "vs.", "etc.", "e.g.", "i.e.",
    "no.", "mt.", "approx.",
];

/// Sentence-boundary collaborator: splits full transcript text into sentences.
pub trait SentenceSplitter: Send + Sync {
    /// Split `text` into sentences in order. Sentences carry no surrounding
    /// whitespace.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Punctuation-based splitter with an abbreviation guard.
#[derive(Debug, Clone)]
pub struct PunctuationSplitter {
    abbreviations: Vec<String>,
}

impl Default for PunctuationSplitter {
    fn default() -> Self {
        Self {
            abbreviations: DEFAULT_ABBREVIATIONS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl PunctuationSplitter {
    /// Use a custom abbreviation list (entries include the trailing period).
    pub fn with_abbreviations(abbreviations: Vec<String>) -> Self {
        Self {
            abbreviations: abbreviations.into_iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    fn ends_with_abbreviation(&self, candidate: &str) -> bool {
        let last = candidate
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .to_lowercase();
        self.abbreviations.iter().any(|a| *a == last)
    }
}

impl SentenceSplitter for PunctuationSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for boundary in SENTENCE_BOUNDARY.find_iter(text) {
            let candidate = text[start..boundary.end()].trim();
            if boundary.end() < text.len() && self.ends_with_abbreviation(candidate) {
                continue;
            }
            if !candidate.is_empty() {
                sentences.push(candidate.to_string());
            }
            start = boundary.end();
        }

        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }

        sentences
    }
}

/// Converts word timestamps into sentence spans.
pub struct SentenceSegmenter {
    splitter: Box<dyn SentenceSplitter>,
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self::new(Box::new(PunctuationSplitter::default()))
    }
}

impl SentenceSegmenter {
    pub fn new(splitter: Box<dyn SentenceSplitter>) -> Self {
        Self { splitter }
    }

    /// Segment the transcript into sentence spans, in transcript order.
    ///
    /// Fails when there are no words, when the splitter finds no sentence, or
    /// when a sentence cannot be mapped onto any word.
    pub fn segment(&self, words: &[WordToken]) -> Result<Vec<SentenceSpan>, TimelineError> {
        if words.is_empty() {
            return Err(TimelineError::EmptyTranscript("no words".to_string()));
        }

        let full_text: String = words.iter().map(|w| w.text.as_str()).collect();

        // Owner word index for every character of the flattened transcript
        let char_owner: Vec<usize> = words
            .iter()
            .enumerate()
            .flat_map(|(idx, word)| std::iter::repeat_n(idx, word.text.chars().count()))
            .collect();

        let sentences = self.splitter.split(&full_text);
        if sentences.is_empty() {
            return Err(TimelineError::EmptyTranscript(
                "no sentences found in transcript".to_string(),
            ));
        }

        let mut spans = Vec::with_capacity(sentences.len());
        let mut cursor = 0usize;

        for (index, sentence) in sentences.into_iter().enumerate() {
            let mut bounds: Option<(f64, f64)> = None;

            for _ in sentence.chars() {
                if let Some(&owner) = char_owner.get(cursor) {
                    let word = &words[owner];
                    bounds = Some(match bounds {
                        Some((start, end)) => (start.min(word.start), end.max(word.end)),
                        None => (word.start, word.end),
                    });
                }
                cursor += 1;
            }
            // Separator stripped by the splitter
            cursor += 1;

            let (start, end) = bounds.ok_or_else(|| TimelineError::UnmatchedSentence {
                index,
                text: sentence.clone(),
            })?;

            debug!("Sentence {} [{:.2}s - {:.2}s]: {}", index, start, end, sentence);
            spans.push(SentenceSpan::new(sentence, start, end));
        }

        Ok(spans)
    }
}
