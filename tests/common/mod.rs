/*!
 * Common test utilities for the dubline test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;

use dubline::app_config::Config;
use dubline::audio::{write_wav, AudioClip};

// Re-export the scripted collaborators module
pub mod mock_collaborators;

/// Sample rate for test fixtures; low enough to keep clips small
pub const TEST_RATE: u32 = 1_000;

/// Length of the test source recording, in seconds
pub const SOURCE_SECS: f64 = 8.0;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Whisper-style transcript with three sentences:
/// "Hello there." [1.0, 2.0], "This is a test." [2.5, 3.6], "Goodbye now." [5.0, 6.0]
pub fn create_test_transcript(dir: &Path) -> Result<PathBuf> {
    let content = r#"{
  "segments": [
    {"words": [
      {"word": " Hello", "start": 1.0, "end": 1.4},
      {"word": " there.", "start": 1.5, "end": 2.0},
      {"word": " This", "start": 2.5, "end": 2.8},
      {"word": " is", "start": 2.8, "end": 3.0},
      {"word": " a", "start": 3.0, "end": 3.1},
      {"word": " test.", "start": 3.1, "end": 3.6}
    ]},
    {"words": [
      {"word": " Goodbye", "start": 5.0, "end": 5.6},
      {"word": " now.", "start": 5.6, "end": 6.0}
    ]}
  ]
}"#;
    create_test_file(dir, "talk.json", content)
}

/// RTTM with two speakers; the short SPEAKER_02 turn is below the filter
pub fn create_test_rttm(dir: &Path) -> Result<PathBuf> {
    let content = "\
SPEAKER talk 1 0.800 2.000 <NA> <NA> SPEAKER_00 <NA> <NA>
SPEAKER talk 1 4.000 0.500 <NA> <NA> SPEAKER_02 <NA> <NA>
SPEAKER talk 1 4.800 2.000 <NA> <NA> SPEAKER_01 <NA> <NA>
";
    create_test_file(dir, "talk.rttm", content)
}

/// Source recording: a quiet ramp, `SOURCE_SECS` long
pub fn create_test_source(dir: &Path) -> Result<PathBuf> {
    let len = (SOURCE_SECS * TEST_RATE as f64) as usize;
    let samples: Vec<i16> = (0..len).map(|i| ((i % 200) as i16) * 10).collect();
    let path = dir.join("talk.wav");
    write_wav(&path, &AudioClip::new(samples, TEST_RATE))?;
    Ok(path)
}

/// Default configuration running at the test sample rate
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = "fr".to_string();
    config.timing.sample_rate = TEST_RATE;
    config
}

/// Asserts two durations match to within a few samples
pub fn assert_secs_eq(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {:.4}s, got {:.4}s",
        expected,
        actual
    );
}
