//! Enrollment orchestration state machine.
//!
//! The session tracks accumulation of fixed-size frames into one batch per
//! enrollment step, submission of that batch, and completion. It owns no
//! I/O: the action driver reads frames, calls the profiler, and feeds the
//! results back in.

use crate::{EnrollFeedback, EnrollUpdate};

/// Callback invoked synchronously once per submitted enrollment step.
///
/// This replaces the decorative progress-animation thread of earlier
/// revisions; display happens on the orchestrating thread, so there is no
/// shared mutable progress state.
pub trait ProgressSink {
    fn on_progress(&mut self, percentage: f32, feedback: EnrollFeedback);
}

/// Discard progress updates.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&mut self, _percentage: f32, _feedback: EnrollFeedback) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentState {
    NotStarted,
    Accumulating,
    Submitted,
    Complete,
}

/// Accumulates captured frames until the engine's minimum sample count is
/// reached, then hands out the batch for a single `enroll` call.
///
/// Submitted audio is never resubmitted: `take_batch` leaves a fresh empty
/// buffer behind. Completion is reached when the engine reports a
/// cumulative percentage of 100 or more; the percentage is always the
/// engine's value, recorded verbatim.
pub struct EnrollmentSession {
    state: EnrollmentState,
    buffer: Vec<i16>,
    min_samples: usize,
    percentage: f32,
}

impl EnrollmentSession {
    pub fn new(min_samples: usize) -> Self {
        Self {
            state: EnrollmentState::NotStarted,
            buffer: Vec::with_capacity(min_samples),
            min_samples,
            percentage: 0.0,
        }
    }

    pub fn state(&self) -> EnrollmentState {
        self.state
    }

    /// Cumulative percentage as last reported by the engine.
    pub fn percentage(&self) -> f32 {
        self.percentage
    }

    pub fn is_complete(&self) -> bool {
        self.state == EnrollmentState::Complete
    }

    /// Minimum sample count rounded up to whole frames of `frame_length`.
    /// 48 000 minimum samples at 512-sample frames means 94 frames
    /// (48 128 samples) go into the first batch.
    pub fn frames_per_batch(&self, frame_length: usize) -> usize {
        self.min_samples.div_ceil(frame_length)
    }

    /// Append one captured frame to the current batch. Returns true once
    /// the batch holds at least the engine's minimum sample count.
    pub fn push_frame(&mut self, frame: &[i16]) -> bool {
        debug_assert!(
            matches!(
                self.state,
                EnrollmentState::NotStarted | EnrollmentState::Accumulating
            ),
            "push_frame in {:?}",
            self.state
        );
        self.state = EnrollmentState::Accumulating;
        self.buffer.extend_from_slice(frame);
        self.buffer.len() >= self.min_samples
    }

    /// Hand out the accumulated batch for one `enroll` submission and start
    /// a fresh, empty buffer.
    pub fn take_batch(&mut self) -> Vec<i16> {
        debug_assert_eq!(self.state, EnrollmentState::Accumulating);
        self.state = EnrollmentState::Submitted;
        std::mem::replace(&mut self.buffer, Vec::with_capacity(self.min_samples))
    }

    /// Record the engine's result for the submitted batch.
    pub fn record(&mut self, update: &EnrollUpdate) {
        debug_assert_eq!(self.state, EnrollmentState::Submitted);
        self.percentage = update.percentage;
        self.state = if update.percentage >= 100.0 {
            EnrollmentState::Complete
        } else {
            EnrollmentState::Accumulating
        };
        tracing::debug!(
            "Enrollment step: {:.1}% ({})",
            update.percentage,
            update.feedback
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(len: usize) -> Vec<i16> {
        vec![1i16; len]
    }

    #[test]
    fn batch_ready_rounds_up_to_whole_frames() {
        // 48000 / 512 = 93.75, so the 94th frame completes the batch.
        let mut session = EnrollmentSession::new(48_000);
        assert_eq!(session.frames_per_batch(512), 94);

        let f = frame(512);
        for _ in 0..93 {
            assert!(!session.push_frame(&f));
        }
        assert!(session.push_frame(&f));

        let batch = session.take_batch();
        assert_eq!(batch.len(), 94 * 512);
    }

    #[test]
    fn percentage_is_recorded_verbatim() {
        let mut session = EnrollmentSession::new(512);
        session.push_frame(&frame(512));
        session.take_batch();
        session.record(&EnrollUpdate {
            percentage: 33.3,
            feedback: EnrollFeedback::AudioOk,
        });
        assert_eq!(session.percentage(), 33.3);
        assert_eq!(session.state(), EnrollmentState::Accumulating);
    }

    #[test]
    fn submitted_audio_is_never_resubmitted() {
        let mut session = EnrollmentSession::new(1024);
        session.push_frame(&frame(512));
        session.push_frame(&frame(512));

        let first = session.take_batch();
        assert_eq!(first.len(), 1024);
        session.record(&EnrollUpdate {
            percentage: 50.0,
            feedback: EnrollFeedback::AudioTooShort,
        });

        // The next batch starts from scratch.
        assert!(!session.push_frame(&frame(512)));
        assert!(session.push_frame(&frame(512)));
        assert_eq!(session.take_batch().len(), 1024);
    }

    #[test]
    fn completes_at_one_hundred_percent() {
        let mut session = EnrollmentSession::new(512);
        session.push_frame(&frame(512));
        session.take_batch();
        session.record(&EnrollUpdate {
            percentage: 100.0,
            feedback: EnrollFeedback::AudioOk,
        });
        assert!(session.is_complete());
    }
}
