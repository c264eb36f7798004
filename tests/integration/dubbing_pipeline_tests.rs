/*!
 * End-to-end dubbing runs with scripted collaborators
 */

use anyhow::Result;
use dubline::app_config::SynthesisEngine;
use dubline::app_controller::{Collaborators, Controller, DubJob};
use dubline::audio::read_wav;
use dubline::synthesis::{Gender, Voice};
use dubline::timeline::{Emotion, Outcome, Regime};
use dubline::translation::SourceTextTranslator;
use dubline::emotion::DisabledClassifier;
use std::path::Path;

use crate::common::{self, mock_collaborators::*, TEST_RATE, SOURCE_SECS};

const LONG_TRANSLATION: &str = "Ceci est une phrase beaucoup trop longue pour la place qu'elle a.";

fn translator() -> MapTranslator {
    MapTranslator::new(&[
        ("Hello there.", "Bonjour a tous"),
        ("This is a test.", LONG_TRANSLATION),
        ("Goodbye now.", "Salut."),
    ])
}

fn job(dir: &Path) -> Result<DubJob> {
    Ok(DubJob {
        media: common::create_test_source(dir)?,
        transcript: common::create_test_transcript(dir)?,
        diarization: common::create_test_rttm(dir)?,
        output: dir.join("out").join("talk.fr.wav"),
        work_dir: dir.join("work"),
        force_overwrite: false,
    })
}

/// One sentence per regime: stretched, dropped, padded
#[tokio::test]
async fn test_dub_withMixedRegimes_shouldAlignTrackToSource() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let job = job(temp_dir.path())?;
    let controller = Controller::with_config(common::test_config())?;

    let translator = translator();
    let synthesizer = CharRateSynthesizer::new(0.1, 0.35, TEST_RATE);
    let collaborators = Collaborators {
        translator: &translator,
        classifier: &FixedClassifier(Emotion::Happy),
        synthesizer: &synthesizer,
        stretcher: &NaiveTempo,
    };

    let report = controller.dub(&job, &collaborators).await?;

    assert_eq!(report.sentences, 3);
    let regimes: Vec<Option<Regime>> = report.chunks.iter().map(|c| c.regime).collect();
    assert_eq!(regimes, vec![Some(Regime::Stretch), Some(Regime::Drop), Some(Regime::Pad)]);
    assert_eq!(report.reconcile.stretched, 1);
    assert_eq!(report.reconcile.dropped, 1);
    assert_eq!(report.reconcile.padded, 1);

    // First gap of 1.0s: 0.2s literal silence, 0.8s lent to the first sentence
    common::assert_secs_eq(report.assembly.leading_silence, 0.2);
    common::assert_secs_eq(report.chunks[0].borrowed, 0.8);
    common::assert_secs_eq(report.chunks[0].adjusted_duration, 1.8);
    // Dropped sentence becomes silence of slot + credit
    common::assert_secs_eq(report.chunks[1].adjusted_duration, 1.6);
    common::assert_secs_eq(report.assembly.closing_silence, 2.0);
    common::assert_secs_eq(report.assembly.track_duration, SOURCE_SECS);
    assert!(report.assembly.drift.abs() < 0.01);

    let track = read_wav(&job.output, TEST_RATE)?;
    common::assert_secs_eq(track.duration_secs(), SOURCE_SECS);
    assert!(job.output.with_extension("json").exists());

    // Records carry speaker, emotion and translation
    assert_eq!(report.records[0].speaker_id, "SPEAKER_00");
    assert_eq!(report.records[1].speaker_id, "SPEAKER_00");
    assert_eq!(report.records[2].speaker_id, "SPEAKER_01");
    assert_eq!(report.records[2].translated_text, "Salut.");
    assert!(report.records.iter().all(|r| r.emotion == Emotion::Happy));
    assert_eq!(report.attribution.intervals_received, 3);
    assert_eq!(report.attribution.intervals_kept, 2);

    // Synthesis got the engine language and the speaker references
    let requests = synthesizer.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.language == "fr" && r.speed == 2.0));
    let references = job.work_dir.join("references");
    assert!(requests
        .iter()
        .all(|r| r.voice.reference().is_some_and(|path| path.starts_with(&references))));
    assert!(references.join("SPEAKER_00.wav").exists());
    assert!(references.join("SPEAKER_01.wav").exists());
    assert!(!references.join("SPEAKER_02.wav").exists());

    Ok(())
}

/// The Google engine speaks with one stock voice and needs no references
#[tokio::test]
async fn test_dub_withGoogleEngine_shouldUseVoiceParams() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let job = job(temp_dir.path())?;

    let mut config = common::test_config();
    config.synthesis.engine = SynthesisEngine::Google;
    config.synthesis.google.gender = Gender::Female;
    config.synthesis.google.voice_name = Some("   ".to_string());
    let controller = Controller::with_config(config)?;

    let translator = translator();
    let synthesizer = CharRateSynthesizer::new(0.1, 0.35, TEST_RATE);
    let collaborators = Collaborators {
        translator: &translator,
        classifier: &DisabledClassifier,
        synthesizer: &synthesizer,
        stretcher: &NaiveTempo,
    };

    let report = controller.dub(&job, &collaborators).await?;
    common::assert_secs_eq(report.assembly.track_duration, SOURCE_SECS);

    let expected = Voice::Params { name: None, gender: Gender::Female };
    let requests = synthesizer.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.voice == expected));
    assert!(!job.work_dir.join("references").exists());
    Ok(())
}

/// A failed synthesis silences its slot and keeps the timeline aligned
#[tokio::test]
async fn test_dub_withSynthesisFailure_shouldSilenceSentence() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let job = job(temp_dir.path())?;
    let controller = Controller::with_config(common::test_config())?;

    let translator = translator();
    let synthesizer = CharRateSynthesizer::new(0.1, 0.35, TEST_RATE).failing_on("Salut");
    let collaborators = Collaborators {
        translator: &translator,
        classifier: &DisabledClassifier,
        synthesizer: &synthesizer,
        stretcher: &NaiveTempo,
    };

    let report = controller.dub(&job, &collaborators).await?;

    assert!(matches!(report.chunks[2].outcome, Outcome::SynthesisFailed { .. }));
    assert_eq!(report.chunks[2].regime, None);
    assert_eq!(report.reconcile.synthesis_failed, 1);
    common::assert_secs_eq(report.chunks[2].adjusted_duration, 1.8);
    assert!(report.assembly.drift.abs() < 0.01);
    Ok(())
}

/// A failing tempo tool falls back to silence for the stretched sentence
#[tokio::test]
async fn test_dub_withBrokenStretcher_shouldFallBackToSilence() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let job = job(temp_dir.path())?;
    let controller = Controller::with_config(common::test_config())?;

    let translator = translator();
    let synthesizer = CharRateSynthesizer::new(0.1, 0.35, TEST_RATE);
    let collaborators = Collaborators {
        translator: &translator,
        classifier: &DisabledClassifier,
        synthesizer: &synthesizer,
        stretcher: &BrokenTempo,
    };

    let report = controller.dub(&job, &collaborators).await?;

    assert!(matches!(report.chunks[0].outcome, Outcome::StretchFailed { .. }));
    assert!(report.chunks[0].outcome.is_silenced());
    assert_eq!(report.reconcile.stretch_failed, 1);
    common::assert_secs_eq(report.chunks[0].adjusted_duration, 1.8);
    assert!(report.assembly.drift.abs() < 0.01);
    Ok(())
}

/// Existing output is only replaced with force_overwrite
#[tokio::test]
async fn test_dub_withExistingOutput_shouldRequireForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut job = job(temp_dir.path())?;
    let controller = Controller::with_config(common::test_config())?;

    let synthesizer = CharRateSynthesizer::new(0.05, 0.35, TEST_RATE);
    let collaborators = Collaborators {
        translator: &SourceTextTranslator,
        classifier: &DisabledClassifier,
        synthesizer: &synthesizer,
        stretcher: &NaiveTempo,
    };

    controller.dub(&job, &collaborators).await?;
    assert!(controller.dub(&job, &collaborators).await.is_err());

    job.force_overwrite = true;
    assert!(controller.dub(&job, &collaborators).await.is_ok());
    Ok(())
}

/// Malformed transcripts stop the run before any synthesis
#[tokio::test]
async fn test_dub_withEmptyTranscript_shouldFailWithoutSynthesis() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut job = job(temp_dir.path())?;
    job.transcript = common::create_test_file(temp_dir.path(), "empty.json", "[]")?;
    let controller = Controller::with_config(common::test_config())?;

    let synthesizer = CharRateSynthesizer::new(0.1, 0.35, TEST_RATE);
    let collaborators = Collaborators {
        translator: &SourceTextTranslator,
        classifier: &DisabledClassifier,
        synthesizer: &synthesizer,
        stretcher: &NaiveTempo,
    };

    assert!(controller.dub(&job, &collaborators).await.is_err());
    assert!(synthesizer.requests().is_empty());
    assert!(!job.output.exists());
    Ok(())
}

/// The plan stage alone writes the sentence records
#[tokio::test]
async fn test_runPlan_withSameLanguage_shouldWriteRecords() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let transcript = common::create_test_transcript(temp_dir.path())?;
    let rttm = common::create_test_rttm(temp_dir.path())?;
    let output = temp_dir.path().join("plan.json");

    let mut config = common::test_config();
    config.target_language = "en".to_string();
    let controller = Controller::with_config(config)?;

    let plan = controller.run_plan(None, &transcript, &rttm, &output).await?;
    assert_eq!(plan.records.len(), 3);
    assert_eq!(plan.records[0].translated_text, "Hello there.");
    assert_eq!(plan.translation.translated, 3);

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
    assert_eq!(written["records"].as_array().map(|a| a.len()), Some(3));
    assert_eq!(written["records"][2]["speaker_id"], "SPEAKER_01");
    Ok(())
}
