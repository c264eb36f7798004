/*!
 * Speaker reference audio.
 *
 * The voice-cloning engine needs a sample of every speaker. Each speaker's
 * sample is the concatenation of all their diarized turns, cut from the
 * source audio at whole-second boundaries.
 */

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::audio::{write_wav, AudioClip};
use crate::errors::AudioError;
use crate::timeline::types::DiarizationInterval;

/// Reference WAV per speaker label.
#[derive(Debug, Clone)]
pub struct SpeakerReferences {
    paths: BTreeMap<String, PathBuf>,
    fallback: PathBuf,
}

/// File name for a speaker label, safe on every platform.
fn file_name_for(speaker: &str) -> String {
    let safe: String = speaker
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}.wav", safe)
}

/// `file_name_for`, with a numeric suffix when another label already took
/// the same name.
fn unique_file_name(speaker: &str, taken: &mut HashSet<String>) -> String {
    let base = file_name_for(speaker);
    let stem = base.trim_end_matches(".wav").to_string();
    let mut name = base;
    let mut suffix = 2;
    while !taken.insert(name.clone()) {
        name = format!("{}_{}.wav", stem, suffix);
        suffix += 1;
    }
    name
}

impl SpeakerReferences {
    /// Cut and write one reference per speaker into `dir`.
    ///
    /// `intervals` should be the turns that survived the duration filter.
    /// When there are none, the whole source becomes the reference for
    /// `fallback_speaker`.
    pub fn build(
        source: &AudioClip,
        intervals: &[DiarizationInterval],
        fallback_speaker: &str,
        dir: &Path,
    ) -> Result<Self, AudioError> {
        let mut clips: BTreeMap<String, AudioClip> = BTreeMap::new();

        for interval in intervals {
            let slice = source.slice(interval.start.trunc(), interval.end.trunc());
            clips
                .entry(interval.speaker_id.clone())
                .or_insert_with(|| AudioClip::empty(source.sample_rate()))
                .append(&slice);
        }

        if clips.is_empty() {
            warn!("No speaker turns; using the whole source as the {} reference", fallback_speaker);
            clips.insert(fallback_speaker.to_string(), source.clone());
        }

        let mut paths = BTreeMap::new();
        let mut taken = HashSet::new();
        for (speaker, clip) in &clips {
            if clip.is_empty() {
                warn!("Reference audio for {} is empty", speaker);
            }
            let file_name = unique_file_name(speaker, &mut taken);
            if file_name != file_name_for(speaker) {
                warn!("Reference file name for {:?} collides with another speaker, using {}", speaker, file_name);
            }
            let path = dir.join(file_name);
            write_wav(&path, clip)?;
            debug!("Reference for {}: {:.1}s at {:?}", speaker, clip.duration_secs(), path);
            paths.insert(speaker.clone(), path);
        }

        // Longest reference stands in for unknown labels
        let fallback = clips
            .iter()
            .max_by_key(|(_, clip)| clip.len())
            .and_then(|(speaker, _)| paths.get(speaker).cloned())
            .unwrap_or_else(|| dir.join(file_name_for(fallback_speaker)));

        Ok(Self { paths, fallback })
    }

    /// Wrap already-written references.
    pub fn from_paths(paths: BTreeMap<String, PathBuf>, fallback: PathBuf) -> Self {
        Self { paths, fallback }
    }

    /// Reference for a speaker, or the fallback reference for unknown labels.
    pub fn path_for(&self, speaker: &str) -> PathBuf {
        self.paths
            .get(speaker)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn speakers(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }
}
