use anyhow::{Result, Context, anyhow};
use log::{warn, info, debug};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle, MultiProgress};
use serde::Serialize;

use crate::app_config::{Config, SynthesisEngine};
use crate::audio::{write_wav, AudioClip, FfmpegTempo, TempoStretcher};
use crate::emotion::{classify_records, CommandClassifier, DisabledClassifier, EmotionClassifier};
use crate::file_utils::FileManager;
use crate::input::{load_diarization, load_transcript};
use crate::language_utils;
use crate::media::{self, MediaExtractor};
use crate::synthesis::{self, CommandSynthesizer, GoogleTtsSynthesizer, SpeakerReferences, SpeechSynthesizer, Voice};
use crate::timeline::{
    AssemblyReport, AttributionStats, DiarizationInterval, ReconcileStats, ReconciledChunk,
    SentenceRecord, SentenceSegmenter, SpeakerAttributor, TimingReconciler, TrackAssembler,
};
use crate::translation::{self, SourceTextTranslator, TranslationService, TranslationStats, Translator};

// @module: Application controller for the dubbing pipeline

/// Inputs and outputs of one dubbing run
#[derive(Debug, Clone)]
pub struct DubJob {
    // @field: Source video or WAV
    pub media: PathBuf,
    // @field: Word-level transcript JSON
    pub transcript: PathBuf,
    // @field: Speaker turns (RTTM or JSON)
    pub diarization: PathBuf,
    // @field: Dubbed vocal track to write
    pub output: PathBuf,
    // @field: Scratch directory for extracted audio and references
    pub work_dir: PathBuf,
    // @field: Replace an existing output
    pub force_overwrite: bool,
}

/// The external collaborators a run talks to
pub struct Collaborators<'a> {
    pub translator: &'a dyn Translator,
    pub classifier: &'a dyn EmotionClassifier,
    pub synthesizer: &'a dyn SpeechSynthesizer,
    pub stretcher: &'a dyn TempoStretcher,
}

/// Sentence records ready for synthesis
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub records: Vec<SentenceRecord>,
    pub attribution: AttributionStats,
    pub translation: TranslationStats,
    // @field: Turns that survived the duration filter
    #[serde(skip)]
    pub speaker_turns: Vec<DiarizationInterval>,
}

/// Everything a dubbing run decided, written next to the track
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source_language: String,
    pub target_language: String,
    pub sentences: usize,
    pub attribution: AttributionStats,
    pub translation: TranslationStats,
    pub reconcile: ReconcileStats,
    pub assembly: AssemblyReport,
    pub records: Vec<SentenceRecord>,
    pub chunks: Vec<ReconciledChunk>,
    pub elapsed_secs: f64,
}

/// Main application controller for video dubbing
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Progress bar container
    multi_progress: MultiProgress,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            multi_progress: MultiProgress::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline with collaborators built from the configuration
    pub async fn run(&self, job: DubJob) -> Result<RunReport> {
        let translator = self.build_translator();
        let classifier = self.build_classifier();
        let synthesizer = self.build_synthesizer();
        let stretcher = FfmpegTempo::new(&self.config.tempo.ffmpeg_path, self.config.tempo.timeout_secs);

        let collaborators = Collaborators {
            translator: translator.as_ref(),
            classifier: classifier.as_ref(),
            synthesizer: synthesizer.as_ref(),
            stretcher: &stretcher,
        };
        self.dub(&job, &collaborators).await
    }

    /// Run only segmentation, attribution, emotion and translation, and
    /// write the sentence records as JSON
    pub async fn run_plan(&self, media: Option<PathBuf>, transcript: &Path, diarization: &Path, output: &Path) -> Result<Plan> {
        let translator = self.build_translator();
        let classifier = self.build_classifier();

        let source = match &media {
            Some(media) => {
                let work_dir = tempfile::tempdir().context("Failed to create scratch directory")?;
                Some(self.load_source(media, work_dir.path()).await?)
            }
            None => None,
        };

        let plan = self
            .plan(transcript, diarization, source.as_ref(), translator.as_ref(), classifier.as_ref())
            .await?;

        let json = serde_json::to_string_pretty(&plan).context("Failed to serialize sentence plan")?;
        FileManager::write_to_file(output, &json)?;
        info!("Success: {}", output.display());
        Ok(plan)
    }

    /// Segment, attribute, classify and translate.
    ///
    /// Emotion classification needs the source audio and is skipped without it.
    pub async fn plan(
        &self,
        transcript: &Path,
        diarization: &Path,
        source: Option<&AudioClip>,
        translator: &dyn Translator,
        classifier: &dyn EmotionClassifier,
    ) -> Result<Plan> {
        let words = load_transcript(transcript)?;
        let turns = load_diarization(diarization)?;

        let spans = SentenceSegmenter::default()
            .segment(&words)
            .context("Failed to segment transcript")?;
        info!("Segmented {} words into {} sentences", words.len(), spans.len());

        let timing = &self.config.timing;
        let attributor = SpeakerAttributor::with_settings(turns, timing.min_turn_secs, timing.fallback_speaker.as_str());
        let (speakers, attribution) = attributor.attribute_all(&spans);
        info!(
            "Attributed sentences: {} by overlap, {} to the main speaker, {} to the fallback",
            attribution.by_overlap, attribution.by_mode, attribution.by_fallback
        );

        let mut records: Vec<SentenceRecord> = spans
            .iter()
            .zip(speakers)
            .map(|(span, speaker)| SentenceRecord::from_span(span, speaker))
            .collect();

        if let Some(source) = source {
            classify_records(classifier, source, &mut records, self.config.emotion_concurrency()).await;
        }

        let target_name = language_utils::get_language_name(&self.config.target_language)?;
        let progress_bar = self.progress_bar(records.len(), "sentences translated");
        let translation = translation::translate_records(
            translator,
            &mut records,
            &target_name,
            self.config.translation.concurrent_requests,
            |done, _| progress_bar.set_position(done as u64),
        )
        .await;
        progress_bar.finish_and_clear();

        Ok(Plan {
            records,
            attribution,
            translation,
            speaker_turns: attributor.intervals().to_vec(),
        })
    }

    /// Run the whole pipeline with the given collaborators and write the
    /// dubbed track and its report
    pub async fn dub(&self, job: &DubJob, collaborators: &Collaborators<'_>) -> Result<RunReport> {
        let start_time = std::time::Instant::now();

        if job.output.exists() && !job.force_overwrite {
            return Err(anyhow!(
                "Output already exists: {:?} (use --force to overwrite)",
                job.output
            ));
        }
        FileManager::ensure_dir(&job.work_dir)?;

        let sample_rate = self.config.timing.sample_rate;
        let source = self.load_source(&job.media, &job.work_dir).await?;

        let plan = self
            .plan(
                &job.transcript,
                &job.diarization,
                Some(&source),
                collaborators.translator,
                collaborators.classifier,
            )
            .await?;

        let engine_language = language_utils::engine_language_code(&self.config.target_language)?;
        let speed = self.config.synthesis.speed;
        let requests = match self.config.synthesis.engine {
            SynthesisEngine::Command => {
                let reference_dir = job.work_dir.join("references");
                FileManager::ensure_dir(&reference_dir)?;
                let references = SpeakerReferences::build(
                    &source,
                    &plan.speaker_turns,
                    &self.config.timing.fallback_speaker,
                    &reference_dir,
                )
                .context("Failed to write speaker reference audio")?;
                synthesis::build_requests(
                    &plan.records,
                    &engine_language,
                    |speaker| Voice::Reference(references.path_for(speaker)),
                    speed,
                )
            }
            SynthesisEngine::Google => {
                let voice = self.config.synthesis.google.voice();
                synthesis::build_requests(&plan.records, &engine_language, |_| voice.clone(), speed)
            }
        };

        let progress_bar = self.progress_bar(requests.len(), "sentences synthesized");
        let clips = synthesis::synthesize_all(
            collaborators.synthesizer,
            &requests,
            self.config.synthesis.concurrent_requests,
            |done, _| progress_bar.set_position(done as u64),
        )
        .await;
        progress_bar.finish_and_clear();

        let progress_bar = self.progress_bar(plan.records.len(), "sentences timed");
        let reconciler = TimingReconciler::new(self.config.reconcile_config(), collaborators.stretcher);
        let timeline = reconciler
            .reconcile_with_progress(&plan.records, clips, |done, _| progress_bar.set_position(done as u64))
            .await?;
        progress_bar.finish_and_clear();

        let last_end = plan.records.last().map(|r| r.end).unwrap_or_default();
        let track = TrackAssembler::new(source.duration_secs()).assemble(&timeline, last_end)?;

        if track.audio.sample_rate() != sample_rate {
            warn!("Track sample rate {} differs from configured {}", track.audio.sample_rate(), sample_rate);
        }
        if let Some(parent) = job.output.parent() {
            FileManager::ensure_dir(parent)?;
        }
        write_wav(&job.output, &track.audio)
            .with_context(|| format!("Failed to write dubbed track: {:?}", job.output))?;

        let report = RunReport {
            source_language: self.config.source_language.clone(),
            target_language: self.config.target_language.clone(),
            sentences: plan.records.len(),
            attribution: plan.attribution,
            translation: plan.translation,
            reconcile: timeline.stats(),
            assembly: track.report,
            records: plan.records,
            chunks: timeline.chunks,
            elapsed_secs: start_time.elapsed().as_secs_f64(),
        };

        let report_path = FileManager::sibling_with_extension(&job.output, "json");
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
        FileManager::write_to_file(&report_path, &json)?;

        info!(
            "Success: {} ({} sentences in {})",
            job.output.display(),
            report.sentences,
            Self::format_duration(start_time.elapsed())
        );
        Ok(report)
    }

    /// Source audio at the track rate, extracted with ffmpeg unless the
    /// media already is a WAV file
    async fn load_source(&self, media: &Path, work_dir: &Path) -> Result<AudioClip> {
        let sample_rate = self.config.timing.sample_rate;
        if media::is_wav(media) {
            return media::load_source_audio(media, sample_rate);
        }
        let extractor = MediaExtractor::new(&self.config.tempo.ffmpeg_path, 600);
        extractor
            .extract_audio(media, work_dir.join("source.wav"), sample_rate)
            .await
    }

    /// Translator for the configured provider; the source text is kept when
    /// no provider can be used in `auto` mode or the languages match
    fn build_translator(&self) -> Box<dyn Translator> {
        if language_utils::language_codes_match(&self.config.source_language, &self.config.target_language) {
            info!("Source and target language match, skipping translation");
            return Box::new(SourceTextTranslator);
        }

        match TranslationService::from_config(&self.config.translation) {
            Ok(service) => {
                debug!("Translation backends: {:?}", service.backend_names());
                Box::new(service)
            }
            Err(e) => {
                warn!("No translation provider available ({}); sentences keep their source text", e);
                Box::new(SourceTextTranslator)
            }
        }
    }

    /// Speech engine for the configured `synthesis.engine`
    fn build_synthesizer(&self) -> Box<dyn SpeechSynthesizer> {
        let sample_rate = self.config.timing.sample_rate;
        match self.config.synthesis.engine {
            SynthesisEngine::Command => Box::new(CommandSynthesizer::from_config(&self.config.synthesis, sample_rate)),
            SynthesisEngine::Google => {
                let target = &self.config.target_language;
                let mapped = language_utils::engine_language_code(target)
                    .ok()
                    .and_then(|code| synthesis::google::google_language_code(&code));
                if mapped.is_none() {
                    warn!(
                        "No Google TTS voice language for '{}', speaking with {}",
                        target,
                        synthesis::google::DEFAULT_GOOGLE_LANGUAGE
                    );
                }
                Box::new(GoogleTtsSynthesizer::from_config(&self.config.synthesis.google, sample_rate))
            }
        }
    }

    fn build_classifier(&self) -> Box<dyn EmotionClassifier> {
        match &self.config.emotion {
            Some(config) => Box::new(CommandClassifier::from_config(config)),
            None => Box::new(DisabledClassifier),
        }
    }

    fn progress_bar(&self, len: usize, unit: &str) -> ProgressBar {
        let progress_bar = self.multi_progress.add(ProgressBar::new(len as u64));
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{eta}}",
            unit
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
