/*!
 * Tests for ISO language code utilities
 */

use anyhow::Result;
use dubline::language_utils::{
    engine_language_code, get_language_name, language_codes_match, normalize_to_part2t,
    validate_language_code, LanguageCodeType,
};

/// Test detection of the code family
#[test]
fn test_validate_language_code_withEachFamily_shouldClassify() -> Result<()> {
    assert_eq!(validate_language_code("fr")?, LanguageCodeType::Part1);
    assert_eq!(validate_language_code("fra")?, LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("fre")?, LanguageCodeType::Part2B);
    assert!(validate_language_code("xx").is_err());
    assert!(validate_language_code("").is_err());
    Ok(())
}

/// Test normalization to three-letter codes
#[test]
fn test_normalize_to_part2t_shouldMapAllForms() -> Result<()> {
    assert_eq!(normalize_to_part2t("de")?, "deu");
    assert_eq!(normalize_to_part2t("ger")?, "deu");
    assert_eq!(normalize_to_part2t("pt_BR")?, "por");
    Ok(())
}

/// Test the code handed to the synthesis engine
#[test]
fn test_engine_language_code_shouldKeepRegion() -> Result<()> {
    assert_eq!(engine_language_code("fra")?, "fr");
    assert_eq!(engine_language_code("zh-CN")?, "zh-cn");
    assert_eq!(engine_language_code("es")?, "es");
    Ok(())
}

/// Test language names used in translation prompts
#[test]
fn test_get_language_name_shouldReturnEnglishNames() -> Result<()> {
    assert_eq!(get_language_name("fr")?, "French");
    assert_eq!(get_language_name("deu")?, "German");
    assert_eq!(get_language_name("zh-tw")?, "Chinese (Traditional)");
    Ok(())
}

/// Test matching across code forms
#[test]
fn test_language_codes_match_shouldIgnoreForm() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("fre", "fr"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("en", "not-a-code"));
}
