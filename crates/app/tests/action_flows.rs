//! End-to-end driver tests over scripted recorders and mock engines.

use tempfile::TempDir;

use voxprint_app::enroll::{run_enrollment, EnrollOutcome};
use voxprint_app::test_loop::run_test;
use voxprint_audio::{ScriptedRecorder, WavSink, WhenExhausted};
use voxprint_foundation::{EngineError, StopFlag};
use voxprint_speaker::mock::{MockRecognizer, MockSpeakerConfig, MockSpeakerEngine};
use voxprint_speaker::{
    EnrollFeedback, ProfileStore, ProgressSink, SpeakerEngineFactory, SpeakerProfile,
};
use voxprint_stt::mock::{MockTranscriber, MockTranscriberConfig};

struct CollectingProgress(Vec<(f32, EnrollFeedback)>);

impl ProgressSink for CollectingProgress {
    fn on_progress(&mut self, percentage: f32, feedback: EnrollFeedback) {
        self.0.push((percentage, feedback));
    }
}

fn small_engine_config() -> MockSpeakerConfig {
    MockSpeakerConfig {
        min_enroll_samples: 1024,
        frame_length: 256,
        step_percentage: 50.0,
        ..Default::default()
    }
}

#[test]
fn enrollment_to_completion_writes_one_profile() {
    let dir = TempDir::new().unwrap();
    let store = ProfileStore::new(dir.path().join("profiles"));

    let engine = MockSpeakerEngine::new(small_engine_config());
    let mut profiler = engine.create_profiler("key").unwrap();

    // 1024 minimum samples at 256-sample frames: 4 frames per batch,
    // two batches at 50% per step.
    let mut recorder = ScriptedRecorder::constant(256, 16_000, 8, 3);
    let mut progress = CollectingProgress(Vec::new());
    let stop = StopFlag::new();

    let outcome = run_enrollment(
        &mut recorder,
        profiler.as_mut(),
        &store,
        "alice",
        &mut progress,
        &stop,
    )
    .unwrap();

    let path = match outcome {
        EnrollOutcome::Saved(path) => path,
        other => panic!("expected saved profile, got {other:?}"),
    };
    assert_eq!(std::fs::read(&path).unwrap(), b"voxprint mock profile");

    // Exactly one file in the store, and the engine saw two whole batches.
    let stored = store.load_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].0, "alice");
    assert_eq!(engine.journal().enroll_batch_lens(), vec![1024, 1024]);

    assert_eq!(
        progress.0,
        vec![
            (50.0, EnrollFeedback::AudioOk),
            (100.0, EnrollFeedback::AudioOk),
        ]
    );
}

#[test]
fn cancelled_enrollment_saves_nothing() {
    let dir = TempDir::new().unwrap();
    let store = ProfileStore::new(dir.path().join("profiles"));

    let engine = MockSpeakerEngine::new(small_engine_config());
    let mut profiler = engine.create_profiler("key").unwrap();

    let stop = StopFlag::new();
    let mut recorder = ScriptedRecorder::constant(256, 16_000, 3, 3)
        .when_exhausted(WhenExhausted::Stop(stop.clone()));
    let mut progress = CollectingProgress(Vec::new());

    let outcome = run_enrollment(
        &mut recorder,
        profiler.as_mut(),
        &store,
        "alice",
        &mut progress,
        &stop,
    )
    .unwrap();

    assert!(matches!(outcome, EnrollOutcome::Cancelled));
    // The store directory was never created, let alone written to.
    assert!(!store.dir().exists());
}

#[test]
fn first_batch_rounds_up_to_whole_frames() {
    let dir = TempDir::new().unwrap();
    let store = ProfileStore::new(dir.path().join("profiles"));

    // Stock engine geometry: 48000 minimum samples, 512-sample frames.
    // 93.75 frames rounds up to 94 frames, 48128 samples.
    let engine = MockSpeakerEngine::new(MockSpeakerConfig {
        step_percentage: 100.0,
        ..Default::default()
    });
    let mut profiler = engine.create_profiler("key").unwrap();

    let mut recorder = ScriptedRecorder::constant(512, 16_000, 94, 1);
    let mut progress = CollectingProgress(Vec::new());
    let stop = StopFlag::new();

    let outcome = run_enrollment(
        &mut recorder,
        profiler.as_mut(),
        &store,
        "alice",
        &mut progress,
        &stop,
    )
    .unwrap();

    assert!(matches!(outcome, EnrollOutcome::Saved(_)));
    assert_eq!(engine.journal().enroll_batch_lens(), vec![94 * 512]);
    assert_eq!(progress.0, vec![(100.0, EnrollFeedback::AudioOk)]);
}

#[test]
fn dead_device_fails_enrollment_without_saving() {
    let dir = TempDir::new().unwrap();
    let store = ProfileStore::new(dir.path().join("profiles"));

    let engine = MockSpeakerEngine::new(small_engine_config());
    let mut profiler = engine.create_profiler("key").unwrap();

    // Script runs out after two frames and the default behavior is a
    // device failure.
    let mut recorder = ScriptedRecorder::constant(256, 16_000, 2, 3);
    let mut progress = CollectingProgress(Vec::new());
    let stop = StopFlag::new();

    let result = run_enrollment(
        &mut recorder,
        profiler.as_mut(),
        &store,
        "alice",
        &mut progress,
        &stop,
    );

    assert!(result.is_err());
    assert!(engine.journal().enroll_batch_lens().is_empty());
    assert!(!store.dir().exists());
}

#[test]
fn activation_limit_surfaces_as_engine_error() {
    let dir = TempDir::new().unwrap();
    let store = ProfileStore::new(dir.path().join("profiles"));

    let engine = MockSpeakerEngine::new(MockSpeakerConfig {
        activation_limit_after: Some(1),
        ..small_engine_config()
    });
    let mut profiler = engine.create_profiler("key").unwrap();

    let mut recorder =
        ScriptedRecorder::constant(256, 16_000, 8, 3).when_exhausted(WhenExhausted::Silence);
    let mut progress = CollectingProgress(Vec::new());
    let stop = StopFlag::new();

    let err = run_enrollment(
        &mut recorder,
        profiler.as_mut(),
        &store,
        "alice",
        &mut progress,
        &stop,
    )
    .unwrap_err();

    let engine_err = err
        .downcast_ref::<EngineError>()
        .expect("engine error should be preserved");
    assert!(engine_err.is_activation());
    assert!(!store.dir().exists());
}

#[test]
fn test_flow_scores_profiles_in_label_order() {
    let dir = TempDir::new().unwrap();
    let store = ProfileStore::new(dir.path().join("profiles"));

    // Saved out of order; load order is lexicographic by label.
    store
        .save("bob", &SpeakerProfile::from_bytes(b"b".to_vec()))
        .unwrap();
    store
        .save("alice", &SpeakerProfile::from_bytes(b"a".to_vec()))
        .unwrap();
    let labels: Vec<String> = store.load_all().unwrap().into_iter().map(|(l, _)| l).collect();
    assert_eq!(labels, ["alice", "bob"]);

    let mut recognizer = MockRecognizer::new(
        MockSpeakerConfig {
            frame_length: 256,
            scores: vec![0.9, 0.1],
            ..Default::default()
        },
        labels.len(),
    );
    let mut transcriber = MockTranscriber::new(MockTranscriberConfig {
        frame_length: 256,
        outputs: vec![
            ("hello ".to_string(), false),
            ("world".to_string(), false),
            (String::new(), true),
        ],
        flush_texts: vec!["hello world".to_string()],
        ..Default::default()
    });

    let stop = StopFlag::new();
    let mut recorder = ScriptedRecorder::constant(256, 16_000, 3, 3)
        .when_exhausted(WhenExhausted::Stop(stop.clone()));

    let summary = run_test(
        &mut recorder,
        &mut recognizer,
        &mut transcriber,
        &labels,
        WavSink::disabled(),
        &stop,
    )
    .unwrap();

    // Three scripted frames plus the silent frame that tripped the stop.
    assert_eq!(summary.frames_processed, 4);
    assert_eq!(summary.utterances, ["hello world"]);
    assert_eq!(summary.recording, None);
    assert_eq!(recognizer.journal().frames_scored(), 4);
    // One flush at the endpoint, one on exit.
    assert_eq!(transcriber.flush_calls(), 2);
}

#[test]
fn score_count_mismatch_ends_the_session() {
    let labels = vec!["alice".to_string(), "bob".to_string()];

    // Engine built over a single profile cannot serve two labels.
    let mut recognizer = MockRecognizer::new(
        MockSpeakerConfig {
            frame_length: 256,
            ..Default::default()
        },
        1,
    );
    let mut transcriber = MockTranscriber::new(MockTranscriberConfig {
        frame_length: 256,
        ..Default::default()
    });

    let stop = StopFlag::new();
    let mut recorder =
        ScriptedRecorder::constant(256, 16_000, 1, 0).when_exhausted(WhenExhausted::Silence);

    let err = run_test(
        &mut recorder,
        &mut recognizer,
        &mut transcriber,
        &labels,
        WavSink::disabled(),
        &stop,
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::ProcessingFailed(_))
    ));
}

#[test]
fn requested_recording_is_written_and_reported() {
    let dir = TempDir::new().unwrap();
    let audio_dir = dir.path().join("audio");

    let labels = vec!["alice".to_string()];
    let mut recognizer = MockRecognizer::new(
        MockSpeakerConfig {
            frame_length: 256,
            scores: vec![0.5],
            ..Default::default()
        },
        1,
    );
    let mut transcriber = MockTranscriber::new(MockTranscriberConfig {
        frame_length: 256,
        ..Default::default()
    });

    let stop = StopFlag::new();
    let mut recorder = ScriptedRecorder::constant(256, 16_000, 2, 7)
        .when_exhausted(WhenExhausted::Stop(stop.clone()));

    let summary = run_test(
        &mut recorder,
        &mut recognizer,
        &mut transcriber,
        &labels,
        WavSink::open(&audio_dir, 16_000),
        &stop,
    )
    .unwrap();

    let path = summary.recording.expect("recording path");
    let len = std::fs::metadata(&path).unwrap().len();
    // WAV header plus three 256-sample frames of 16-bit audio.
    assert_eq!(len, 44 + 3 * 256 * 2);
}
