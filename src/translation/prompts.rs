/*!
 * Prompt templates for sentence translation.
 *
 * Each sentence is translated alone, with the previous and next source
 * sentences as context. Two prompt styles exist because the two hosted
 * services respond differently: the dubbing prompt asks for a bare
 * translation, the tagged prompt asks for the translation inside
 * `[[sentence translation: ...]]` so chatty models can be parsed.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static TAGGED_TRANSLATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[\[sentence translation: (.*?)\]\]").expect("Invalid translation tag regex")
});

/// One sentence to translate with its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Sentence to translate
    pub sentence: String,
    /// Previous source sentence, empty for the first one
    pub before: String,
    /// Next source sentence, empty for the last one
    pub after: String,
    /// Target language name, e.g. "French"
    pub target_language: String,
}

impl TranslationRequest {
    pub fn new(sentence: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
            before: String::new(),
            after: String::new(),
            target_language: target_language.into(),
        }
    }

    pub fn with_context(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before = before.into();
        self.after = after.into();
        self
    }
}

/// How the prompt is phrased and how the answer is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Dubbing-oriented prompt, answer is the bare translation
    Dubbing,
    /// Concise prompt, answer wrapped in a `[[sentence translation: ...]]` tag
    Tagged,
}

impl PromptStyle {
    pub const DUBBING_TEMPLATE: &'static str = "\
Role: You are a professional translator specializing in video dubbing and subtitle translation.

Task: Translate the given sentence into {target_language} while maintaining:
- Natural flow and timing suitable for video dubbing
- Emotional tone and context
- Cultural appropriateness

Context:
Previous: {before}
Current: {sentence}
Next: {after}

Provide only the translation without explanations.";

    pub const TAGGED_TEMPLATE: &'static str = "\
Role: You are a professional translator who translates concisely in short sentences while preserving meaning and context.

Instruction:
Translate the given sentence into {target_language}. Consider the context provided by the previous and next sentences.

Previous context: {before}
Sentence to translate: {sentence}
Next context: {after}

Output format:
[[sentence translation: <your translation>]]";

    /// Render the user prompt for a request.
    pub fn render(&self, request: &TranslationRequest) -> String {
        let template = match self {
            Self::Dubbing => Self::DUBBING_TEMPLATE,
            Self::Tagged => Self::TAGGED_TEMPLATE,
        };
        template
            .replace("{target_language}", &request.target_language)
            .replace("{before}", &request.before)
            .replace("{after}", &request.after)
            .replace("{sentence}", &request.sentence)
    }

    /// Pull the translation out of a raw model answer.
    ///
    /// Tagged answers without the tag are used whole.
    pub fn extract(&self, response: &str) -> String {
        match self {
            Self::Dubbing => response.trim().to_string(),
            Self::Tagged => TAGGED_TRANSLATION
                .captures(response)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| response.trim().to_string()),
        }
    }
}
