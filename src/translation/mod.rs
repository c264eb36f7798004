/*!
 * Sentence translation for the dubbing pipeline.
 *
 * - `prompts`: prompt templates and answer extraction
 * - `service`: provider-backed `TranslationService` with fallback
 *
 * Translation never aborts a run: a sentence whose translation fails keeps
 * its source text.
 */

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{info, warn};
use serde::Serialize;

use crate::errors::TranslationError;
use crate::timeline::types::SentenceRecord;

pub mod prompts;
pub mod service;

pub use self::prompts::{PromptStyle, TranslationRequest};
pub use self::service::TranslationService;

/// Translation collaborator
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one sentence with its context
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError>;
}

/// Keeps every sentence in its source language
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceTextTranslator;

#[async_trait]
impl Translator for SourceTextTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError> {
        Ok(request.sentence.clone())
    }
}

/// Outcome counts of a translation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranslationStats {
    pub translated: usize,
    /// Sentences left in the source language after a failure
    pub fallbacks: usize,
}

/// Build one request per record, with neighbouring source sentences as context.
pub fn build_requests(records: &[SentenceRecord], target_language: &str) -> Vec<TranslationRequest> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let before = i
                .checked_sub(1)
                .and_then(|prev| records.get(prev))
                .map(|r| r.source_text.as_str())
                .unwrap_or_default();
            let after = records
                .get(i + 1)
                .map(|r| r.source_text.as_str())
                .unwrap_or_default();
            TranslationRequest::new(record.source_text.as_str(), target_language).with_context(before, after)
        })
        .collect()
}

/// Translate every record in place, `concurrency` sentences at a time.
///
/// Order is preserved. Failed sentences keep their source text.
pub async fn translate_records(
    translator: &dyn Translator,
    records: &mut [SentenceRecord],
    target_language: &str,
    concurrency: usize,
    progress: impl Fn(usize, usize),
) -> TranslationStats {
    let requests = build_requests(records, target_language);
    let total = requests.len();

    let mut results = stream::iter(requests.iter().map(|request| translator.translate(request)))
        .buffered(concurrency.max(1))
        .enumerate();

    let mut stats = TranslationStats::default();
    while let Some((index, result)) = results.next().await {
        let record = &mut records[index];
        match result {
            Ok(translated) => {
                record.translated_text = translated;
                stats.translated += 1;
            }
            Err(e) => {
                warn!("Sentence {}: translation failed, keeping source text: {}", index, e);
                record.translated_text = record.source_text.clone();
                stats.fallbacks += 1;
            }
        }
        progress(index + 1, total);
    }

    info!(
        "Translated {} of {} sentences ({} kept in source language)",
        stats.translated, total, stats.fallbacks
    );
    stats
}
