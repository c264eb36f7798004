/*!
 * Tests for transcript and diarization loading
 */

use anyhow::Result;
use dubline::input::{load_diarization, load_transcript};

use crate::common;

/// Test loading the whisper-style fixture
#[test]
fn test_load_transcript_withSegments_shouldFlattenInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_transcript(temp_dir.path())?;

    let words = load_transcript(path)?;
    assert_eq!(words.len(), 8);
    assert_eq!(words[0].text, " Hello");
    assert_eq!(words[7].text, " now.");
    assert_eq!(words[7].end, 6.0);
    Ok(())
}

/// Test that a missing transcript is reported with its path
#[test]
fn test_load_transcript_withMissingFile_shouldFail() {
    let err = load_transcript("/nonexistent/talk.json").unwrap_err();
    assert!(format!("{:#}", err).contains("talk.json"));
}

/// Test loading RTTM keeps every turn; filtering happens later
#[test]
fn test_load_diarization_withRttm_shouldKeepShortTurns() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_rttm(temp_dir.path())?;

    let turns = load_diarization(path)?;
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1].speaker_id, "SPEAKER_02");
    assert!((turns[2].end - 6.8).abs() < 1e-9);
    Ok(())
}

/// Test loading a JSON turn list without extension hint
#[test]
fn test_load_diarization_withJsonContent_shouldSniffFormat() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "turns.txt",
        r#"[{"start": 0.0, "end": 3.0, "speaker": "A"}]"#,
    )?;

    let turns = load_diarization(path)?;
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].speaker_id, "A");
    Ok(())
}

/// Test that unrecognized content is rejected
#[test]
fn test_load_diarization_withUnknownFormat_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "turns.txt", "0.0 3.0 A")?;
    assert!(load_diarization(path).is_err());
    Ok(())
}
