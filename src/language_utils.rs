use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating and normalizing ISO 639-1
/// (2-letter) and ISO 639-2 (3-letter) language codes, optionally followed by
/// a region subtag such as `zh-cn`.
/// Language code type
#[derive(Debug, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Split `zh-CN` / `pt_BR` into the lowercase base code and optional region
fn split_region(code: &str) -> (String, Option<String>) {
    let normalized = code.trim().to_lowercase().replace('_', "-");
    match normalized.split_once('-') {
        Some((base, region)) if !region.is_empty() => (base.to_string(), Some(region.to_string())),
        _ => (normalized.trim_end_matches('-').to_string(), None),
    }
}

fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let (base, _) = split_region(code);

    if base.len() == 2 {
        if Language::from_639_1(&base).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if base.len() == 3 {
        if Language::from_639_3(&base).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if bibliographic_to_terminology(&base).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let (base, _) = split_region(code);

    if base.len() == 2 {
        if let Some(lang) = Language::from_639_1(&base) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if base.len() == 3 {
        if Language::from_639_3(&base).is_some() {
            return Ok(base);
        }
        if let Some(terminology) = bibliographic_to_terminology(&base) {
            return Ok(terminology.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Code handed to the speech synthesis engine: ISO 639-1 where one exists,
/// region subtag kept (`zh-cn`)
pub fn engine_language_code(code: &str) -> Result<String> {
    let (_, region) = split_region(code);
    let part3 = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part3)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", part3))?;
    let base = lang.to_639_1().map(str::to_string).unwrap_or(part3);

    Ok(match region {
        Some(region) => format!("{}-{}", base, region),
        None => base,
    })
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code, as used in translation prompts
pub fn get_language_name(code: &str) -> Result<String> {
    let (base, region) = split_region(code);
    let normalized = normalize_to_part2t(&base)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    let name = lang.to_name().to_string();
    Ok(match (normalized.as_str(), region.as_deref()) {
        ("zho", Some("cn")) | ("zho", Some("hans")) => format!("{} (Simplified)", name),
        ("zho", Some("tw")) | ("zho", Some("hant")) => format!("{} (Traditional)", name),
        _ => name,
    })
}
