//! Blocking driver for the enroll action.

use std::path::PathBuf;

use voxprint_audio::Recorder;
use voxprint_foundation::StopFlag;
use voxprint_speaker::{EnrollmentSession, ProfileStore, ProgressSink, SpeakerProfiler};

/// How an enrollment run ended.
#[derive(Debug)]
pub enum EnrollOutcome {
    /// Enrollment reached 100% and the profile was written to this path.
    Saved(PathBuf),
    /// The stop flag fired before completion. Nothing was written.
    Cancelled,
}

/// Console renderer for enrollment progress, one line per submitted step.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn on_progress(&mut self, percentage: f32, feedback: voxprint_speaker::EnrollFeedback) {
        println!("[{:>3.0}%] {}", percentage, feedback.message());
    }
}

/// Run one enrollment session to completion or cancellation.
///
/// Frames are accumulated into whole-frame batches of at least the
/// engine's minimum sample count, each batch is submitted exactly once,
/// and the profile is exported and saved only after the engine reports
/// 100%. The recorder is stopped on every exit path.
pub fn run_enrollment(
    recorder: &mut dyn Recorder,
    profiler: &mut dyn SpeakerProfiler,
    store: &ProfileStore,
    label: &str,
    progress: &mut dyn ProgressSink,
    stop: &StopFlag,
) -> anyhow::Result<EnrollOutcome> {
    voxprint_speaker::validate_label(label)?;

    let mut session = EnrollmentSession::new(profiler.min_enroll_samples());
    let mut frame = vec![0i16; recorder.frame_length()];

    tracing::info!(
        "Enrolling '{}': {} frames per batch at {} Hz",
        label,
        session.frames_per_batch(recorder.frame_length()),
        profiler.sample_rate()
    );

    recorder.start()?;
    let result = (|| -> anyhow::Result<EnrollOutcome> {
        while !session.is_complete() {
            if stop.is_stopped() {
                tracing::info!("Enrollment cancelled before completion; nothing saved");
                return Ok(EnrollOutcome::Cancelled);
            }

            recorder.read(&mut frame)?;
            if !session.push_frame(&frame) {
                continue;
            }

            let batch = session.take_batch();
            let update = profiler.enroll(&batch)?;
            session.record(&update);
            progress.on_progress(session.percentage(), update.feedback);
        }

        let profile = profiler.export()?;
        let path = store.save(label, &profile)?;
        Ok(EnrollOutcome::Saved(path))
    })();
    recorder.stop();
    result
}
