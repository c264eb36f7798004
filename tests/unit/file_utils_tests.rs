/*!
 * Tests for file utility functions
 */

use std::path::Path;
use anyhow::Result;
use dubline::file_utils::{AnnotationFormat, FileManager};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that generate_output_path creates the correct path
#[test]
fn test_generate_output_path_withValidInputs_shouldCreateCorrectPath() {
    let input_file = Path::new("/tmp/input/video.mkv");
    let output_dir = Path::new("/tmp/output");

    let output_path = FileManager::generate_output_path(input_file, output_dir, "fr", "wav");

    assert_eq!(output_path, Path::new("/tmp/output/video.fr.wav"));
    assert_eq!(
        FileManager::sibling_with_extension(&output_path, "json"),
        Path::new("/tmp/output/video.fr.json")
    );
}

/// Test that write_to_file creates missing parent directories
#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b").join("report.json");

    FileManager::write_to_file(&nested, "{}")?;
    assert_eq!(FileManager::read_to_string(&nested)?, "{}");
    Ok(())
}

/// Test format detection by extension and by content
#[test]
fn test_detect_annotation_format_shouldRecognizeRttmAndJson() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let rttm = common::create_test_rttm(temp_dir.path())?;
    let json = common::create_test_file(temp_dir.path(), "turns.txt", "[]")?;
    let other = common::create_test_file(temp_dir.path(), "notes.txt", "hello")?;

    assert_eq!(FileManager::detect_annotation_format(rttm)?, AnnotationFormat::Rttm);
    assert_eq!(FileManager::detect_annotation_format(json)?, AnnotationFormat::Json);
    assert_eq!(FileManager::detect_annotation_format(other)?, AnnotationFormat::Unknown);
    Ok(())
}
