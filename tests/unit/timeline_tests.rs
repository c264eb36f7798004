/*!
 * Tests for the timeline core through its public API
 */

use anyhow::Result;
use dubline::audio::AudioClip;
use dubline::errors::{SynthesisError, TimelineError};
use dubline::timeline::{
    DiarizationInterval, Outcome, ReconcileConfig, Regime, SentenceRecord, SentenceSegmenter,
    SilenceBudget, SpeakerAttributor, TimingReconciler, TrackAssembler, WordToken,
};

use crate::common::{self, mock_collaborators::NaiveTempo, TEST_RATE};

fn config() -> ReconcileConfig {
    ReconcileConfig {
        sample_rate: TEST_RATE,
        tail_trim_ms: 0,
        ..ReconcileConfig::default()
    }
}

fn record(start: f64, end: f64) -> SentenceRecord {
    SentenceRecord {
        translated_text: "x".to_string(),
        source_text: "x".to_string(),
        start,
        end,
        speaker_id: "SPEAKER_00".to_string(),
        emotion: Default::default(),
    }
}

fn speech(seconds: f64) -> Result<AudioClip, SynthesisError> {
    Ok(AudioClip::new(vec![500; (seconds * TEST_RATE as f64).round() as usize], TEST_RATE))
}

/// Test regime boundaries at the default floor
#[test]
fn test_regime_select_atBoundaries_shouldMatchPolicy() {
    let floor = 0.44;
    assert_eq!(Regime::select(1.0, 1.0, floor), Regime::Pad);
    assert_eq!(Regime::select(0.9, 1.0, floor), Regime::Stretch);
    assert_eq!(Regime::select(0.45, 1.0, floor), Regime::Stretch);
    assert_eq!(Regime::select(0.44, 1.0, floor), Regime::Drop);
    assert_eq!(Regime::select(1.0, 0.0, floor), Regime::Pad);
}

/// Test segmentation then attribution on overlapping turns
#[test]
fn test_segment_thenAttribute_shouldPickLargestOverlap() -> Result<()> {
    let words = vec![
        WordToken::new(" One", 0.0, 0.5),
        WordToken::new(" two.", 0.5, 2.0),
        WordToken::new(" Three", 2.2, 3.0),
        WordToken::new(" four.", 3.0, 4.5),
    ];
    let spans = SentenceSegmenter::default().segment(&words)?;
    assert_eq!(spans.len(), 2);

    let attributor = SpeakerAttributor::new(vec![
        DiarizationInterval::new(0.0, 2.1, "A"),
        DiarizationInterval::new(2.1, 4.0, "B"),
        DiarizationInterval::new(3.9, 4.5, "C"),
    ]);
    let (speakers, stats) = attributor.attribute_all(&spans);
    assert_eq!(speakers, vec!["A", "B"]);
    assert_eq!(stats.intervals_kept, 2);
    assert_eq!(stats.by_overlap, 2);
    Ok(())
}

/// Test that the silence budget accounts for every gap second
#[test]
fn test_silenceBudget_shouldConserveGaps() {
    let (mut budget, leading) = SilenceBudget::from_leading_gap(2.0, 0.8);
    assert!((leading - 1.2).abs() < 1e-9);
    assert!((budget.pending() - 0.8).abs() < 1e-9);

    let extra = budget.advance(3.0, Some(3.5));
    assert_eq!(extra, 0.0);
    assert!((budget.pending() - 0.5).abs() < 1e-9);

    assert_eq!(budget.advance(4.0, None), 0.0);
    assert_eq!(budget.pending(), 0.0);
}

/// Test that fitting sentences keep the track aligned with the source
#[tokio::test]
async fn test_reconcile_thenAssemble_shouldMatchSourceDuration() -> Result<()> {
    let records = vec![record(0.5, 2.0), record(2.4, 3.4), record(5.0, 6.0)];
    let clips = vec![speech(1.2), speech(1.6), speech(0.3)];

    let stretcher = NaiveTempo;
    let reconciler = TimingReconciler::new(config(), &stretcher);
    let timeline = reconciler.reconcile(&records, clips).await?;

    assert!(matches!(timeline.chunks[0].outcome, Outcome::Padded));
    assert!(matches!(timeline.chunks[1].outcome, Outcome::Stretched { .. }));
    assert!(matches!(timeline.chunks[2].outcome, Outcome::Padded));

    let track = TrackAssembler::new(7.0).assemble(&timeline, 6.0)?;
    common::assert_secs_eq(track.report.track_duration, 7.0);
    common::assert_secs_eq(track.audio.duration_secs(), 7.0);
    Ok(())
}

/// Test that an overlong clip overruns nothing: it is dropped to silence
#[tokio::test]
async fn test_reconcile_withOverlongClip_shouldDropIt() -> Result<()> {
    let records = vec![record(0.0, 1.0)];
    let stretcher = NaiveTempo;
    let timeline = TimingReconciler::new(config(), &stretcher)
        .reconcile(&records, vec![speech(3.0)])
        .await?;

    let chunk = &timeline.chunks[0];
    assert_eq!(chunk.regime, Some(Regime::Drop));
    assert!(chunk.audio.is_silent());
    common::assert_secs_eq(chunk.duration(), 1.0);
    Ok(())
}

/// Test that clip and sentence counts must agree
#[tokio::test]
async fn test_reconcile_withMissingClips_shouldFail() {
    let records = vec![record(0.0, 1.0), record(1.0, 2.0)];
    let stretcher = NaiveTempo;
    let result = TimingReconciler::new(config(), &stretcher)
        .reconcile(&records, vec![speech(0.5)])
        .await;
    assert_eq!(
        result.err(),
        Some(TimelineError::ClipCountMismatch { expected: 2, actual: 1 })
    );
}
