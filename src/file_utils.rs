use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path for a dubbed track
    // @params: media_file, output_dir, target_language, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        media_file: P1,
        output_dir: P2,
        target_language: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = media_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(target_language);
        output_filename.push('.');
        output_filename.push_str(extension);

        output_dir.as_ref().join(output_filename)
    }

    /// Path next to `path` with its extension replaced
    pub fn sibling_with_extension<P: AsRef<Path>>(path: P, extension: &str) -> PathBuf {
        path.as_ref().with_extension(extension)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Detect how an annotation file is encoded, by extension first and
    /// content second
    pub fn detect_annotation_format<P: AsRef<Path>>(path: P) -> Result<AnnotationFormat> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        if let Some(ext) = path.extension() {
            match ext.to_string_lossy().to_lowercase().as_str() {
                "json" => return Ok(AnnotationFormat::Json),
                "rttm" => return Ok(AnnotationFormat::Rttm),
                _ => {}
            }
        }

        let content = Self::read_to_string(path)?;
        let trimmed = content.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return Ok(AnnotationFormat::Json);
        }
        if trimmed.starts_with("SPEAKER") {
            return Ok(AnnotationFormat::Rttm);
        }

        Ok(AnnotationFormat::Unknown)
    }
}

/// Encoding of a transcript or diarization file
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AnnotationFormat {
    /// JSON document
    Json,
    /// Rich Transcription Time Marked, one turn per line
    Rttm,
    /// Unknown encoding
    Unknown,
}
