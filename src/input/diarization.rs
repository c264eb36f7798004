/*!
 * Speaker-turn loading.
 *
 * Reads RTTM (`SPEAKER <file> <chan> <start> <duration> <NA> <NA> <label> ...`)
 * or a JSON array of `{start, end, speaker}`. The duration filter is applied
 * later by the attributor, not here.
 */

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::debug;

use crate::file_utils::{AnnotationFormat, FileManager};
use crate::timeline::types::DiarizationInterval;

/// Load speaker turns, picking the parser from the file's format.
pub fn load_diarization<P: AsRef<Path>>(path: P) -> Result<Vec<DiarizationInterval>> {
    let path = path.as_ref();
    let format = FileManager::detect_annotation_format(path)?;
    let content = FileManager::read_to_string(path)?;

    let intervals = match format {
        AnnotationFormat::Rttm => parse_rttm(&content),
        AnnotationFormat::Json => parse_json(&content),
        AnnotationFormat::Unknown => Err(anyhow!("Unrecognized diarization format")),
    }
    .with_context(|| format!("Failed to parse diarization: {:?}", path))?;

    debug!("Loaded {} speaker turns from {:?}", intervals.len(), path);
    Ok(intervals)
}

/// Parse RTTM text. Non-`SPEAKER` records, blank lines and `#` comments are
/// ignored.
pub fn parse_rttm(content: &str) -> Result<Vec<DiarizationInterval>> {
    let mut intervals = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields[0] != "SPEAKER" {
            continue;
        }
        if fields.len() < 8 {
            return Err(anyhow!(
                "Line {}: expected at least 8 RTTM fields, found {}",
                line_no + 1,
                fields.len()
            ));
        }

        let start: f64 = fields[3]
            .parse()
            .with_context(|| format!("Line {}: invalid turn onset {:?}", line_no + 1, fields[3]))?;
        let duration: f64 = fields[4]
            .parse()
            .with_context(|| format!("Line {}: invalid turn duration {:?}", line_no + 1, fields[4]))?;

        intervals.push(DiarizationInterval::new(start, start + duration, fields[7]));
    }

    Ok(intervals)
}

/// Parse a JSON array of turns.
pub fn parse_json(content: &str) -> Result<Vec<DiarizationInterval>> {
    serde_json::from_str(content).context("Expected a JSON array of {start, end, speaker}")
}
