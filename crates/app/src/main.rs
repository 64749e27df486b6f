use anyhow::Context;
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use voxprint_app::cli::{Cli, Command, EnrollArgs, SessionConfig, TestArgs};
use voxprint_app::enroll::{run_enrollment, ConsoleProgress, EnrollOutcome};
use voxprint_app::test_loop::run_test;
use voxprint_audio::{list_input_devices, CpalRecorder, Recorder, WavSink, DEFAULT_FRAME_LENGTH};
use voxprint_foundation::{install_ctrlc, SessionState, SessionTracker, StopFlag};
use voxprint_speaker::mock::MockSpeakerEngine;
use voxprint_speaker::{ProfileStore, SpeakerEngineFactory, SpeakerProfile};
use voxprint_stt::mock::MockTranscriberEngine;
use voxprint_stt::TranscriberFactory;

/// Logs go to `logs/voxprint.log.*` only; stdout belongs to the live
/// score and transcript lines.
fn init_logging() -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all("logs").context("creating logs directory")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "voxprint.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file_writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging()?;
    tracing::info!("voxprint starting");

    match cli.command {
        Command::Devices => cmd_devices(),
        Command::Enroll(args) => cmd_enroll(args),
        Command::Test(args) => cmd_test(args),
    }
}

fn cmd_devices() -> anyhow::Result<()> {
    let devices = list_input_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found.");
        return Ok(());
    }
    for (index, name) in devices.iter().enumerate() {
        println!("Device #{index}: {name}");
    }
    Ok(())
}

fn cmd_enroll(args: EnrollArgs) -> anyhow::Result<()> {
    let config = SessionConfig::from_args(&args.common)?;
    let store = ProfileStore::new(&config.profile_dir);

    let stop = StopFlag::new();
    install_ctrlc(&stop).context("installing Ctrl-C handler")?;

    let tracker = SessionTracker::new();
    tracker.transition(SessionState::Enrolling)?;

    // Deterministic in-tree backend; a vendor SDK backend plugs in behind
    // the same factory trait.
    let engine = MockSpeakerEngine::default();
    let mut profiler = engine.create_profiler(&config.access_key)?;
    println!("Speaker engine version: {}", profiler.version());

    let mut recorder = CpalRecorder::open(
        DEFAULT_FRAME_LENGTH,
        profiler.sample_rate(),
        config.device_index,
    )?;
    println!("Recording audio from '{}'", recorder.selected_device());
    println!("Keep speaking until enrollment reaches 100% (Ctrl-C to stop)");

    let mut progress = ConsoleProgress;
    let outcome = run_enrollment(
        &mut recorder,
        profiler.as_mut(),
        &store,
        &args.name,
        &mut progress,
        &stop,
    );
    tracker.transition(SessionState::Idle)?;

    match outcome? {
        EnrollOutcome::Saved(path) => {
            println!("Speaker profile for '{}' saved to {}", args.name, path.display());
        }
        EnrollOutcome::Cancelled => {
            println!("Enrollment stopped. No speaker profile was saved.");
        }
    }
    Ok(())
}

fn cmd_test(args: TestArgs) -> anyhow::Result<()> {
    let config = SessionConfig::from_args(&args.common)?;
    let options = args.transcriber_options()?;
    let store = ProfileStore::new(&config.profile_dir);

    let profiles = store.load_all()?;
    if profiles.is_empty() {
        anyhow::bail!(
            "no speaker profiles found in {}; run `voxprint enroll` first",
            store.dir().display()
        );
    }
    let (labels, blobs): (Vec<String>, Vec<SpeakerProfile>) = profiles.into_iter().unzip();
    println!("Loaded {} profile(s): {}", labels.len(), labels.join(", "));

    let stop = StopFlag::new();
    install_ctrlc(&stop).context("installing Ctrl-C handler")?;

    let tracker = SessionTracker::new();
    tracker.transition(SessionState::Testing)?;

    let speaker_engine = MockSpeakerEngine::default();
    let mut recognizer = speaker_engine.create_recognizer(&config.access_key, &blobs)?;
    let mut transcriber = MockTranscriberEngine::default().create(&config.access_key, &options)?;

    let mut recorder = CpalRecorder::open(
        recognizer.frame_length(),
        recognizer.sample_rate(),
        config.device_index,
    )?;
    println!("Recording audio from '{}'", recorder.selected_device());
    println!("Listening... (Ctrl-C to stop)");

    let wav = if args.record_audio {
        WavSink::open(&args.audio_dir, recorder.sample_rate())
    } else {
        WavSink::disabled()
    };

    let summary = run_test(
        &mut recorder,
        recognizer.as_mut(),
        transcriber.as_mut(),
        &labels,
        wav,
        &stop,
    );
    tracker.transition(SessionState::Idle)?;
    let summary = summary?;

    println!(
        "Session ended after {} frames with {} completed utterance(s).",
        summary.frames_processed,
        summary.utterances.len()
    );
    if let Some(path) = summary.recording {
        println!("Session audio saved to {}", path.display());
    }
    Ok(())
}
