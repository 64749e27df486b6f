//! Deterministic in-memory recorder for tests and engine-free demos.

use std::collections::VecDeque;

use crate::capture::Recorder;
use voxprint_foundation::{AudioError, StopFlag};

/// What a [`ScriptedRecorder`] does once its canned frames run out.
#[derive(Debug, Clone)]
pub enum WhenExhausted {
    /// Keep delivering silent frames.
    Silence,
    /// Trip the given stop flag and deliver silence, emulating a user who
    /// stops the session after the scripted audio.
    Stop(StopFlag),
    /// Fail the read, emulating a device that died mid-session.
    Fail,
}

/// Recorder that replays a fixed frame script.
pub struct ScriptedRecorder {
    frames: VecDeque<Vec<i16>>,
    frame_length: usize,
    sample_rate: u32,
    started: bool,
    when_exhausted: WhenExhausted,
    frames_read: u64,
}

impl ScriptedRecorder {
    /// Every scripted frame must be exactly `frame_length` samples.
    pub fn new(frame_length: usize, sample_rate: u32, frames: Vec<Vec<i16>>) -> Self {
        assert!(
            frames.iter().all(|f| f.len() == frame_length),
            "scripted frames must match the frame length"
        );
        Self {
            frames: frames.into(),
            frame_length,
            sample_rate,
            started: false,
            when_exhausted: WhenExhausted::Fail,
            frames_read: 0,
        }
    }

    /// Convenience: `count` frames all filled with `value`.
    pub fn constant(frame_length: usize, sample_rate: u32, count: usize, value: i16) -> Self {
        Self::new(
            frame_length,
            sample_rate,
            vec![vec![value; frame_length]; count],
        )
    }

    pub fn when_exhausted(mut self, behavior: WhenExhausted) -> Self {
        self.when_exhausted = behavior;
        self
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

impl Recorder for ScriptedRecorder {
    fn frame_length(&self) -> usize {
        self.frame_length
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn selected_device(&self) -> &str {
        "scripted"
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.started = true;
        Ok(())
    }

    fn read(&mut self, frame: &mut [i16]) -> Result<(), AudioError> {
        if !self.started {
            return Err(AudioError::NotStarted);
        }
        debug_assert_eq!(frame.len(), self.frame_length);

        match self.frames.pop_front() {
            Some(next) => frame.copy_from_slice(&next),
            None => match &self.when_exhausted {
                WhenExhausted::Silence => frame.fill(0),
                WhenExhausted::Stop(flag) => {
                    flag.trigger();
                    frame.fill(0);
                }
                WhenExhausted::Fail => return Err(AudioError::DeviceStalled),
            },
        }

        self.frames_read += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
    }
}
