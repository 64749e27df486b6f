//! Streaming transcription boundary for VoxPrint.
//!
//! The transcription engine is an opaque vendor component fed one fixed
//! frame at a time. This crate defines the trait the test loop talks to,
//! the transcript accumulation with its endpoint flush policy, and a
//! scripted mock backend.

pub mod mock;
pub mod types;

pub use types::{TranscriptLog, TranscriberOutput};

use voxprint_foundation::EngineError;

/// Options handed to the engine at creation time.
#[derive(Debug, Clone)]
pub struct TranscriberOptions {
    /// Trailing-silence duration after which the engine marks an endpoint.
    pub endpoint_duration_sec: f32,
    pub enable_punctuation: bool,
}

impl Default for TranscriberOptions {
    fn default() -> Self {
        Self {
            endpoint_duration_sec: 1.0,
            enable_punctuation: false,
        }
    }
}

/// Streaming speech-to-text interface.
///
/// `process` consumes exactly one frame and returns the partial transcript
/// delta plus an endpoint flag; `flush` finalizes the current utterance.
pub trait StreamingTranscriber {
    fn sample_rate(&self) -> u32;

    fn frame_length(&self) -> usize;

    fn process(&mut self, frame: &[i16]) -> Result<TranscriberOutput, EngineError>;

    fn flush(&mut self) -> Result<String, EngineError>;
}

/// Constructor boundary for transcription engines.
pub trait TranscriberFactory {
    fn create(
        &self,
        access_key: &str,
        options: &TranscriberOptions,
    ) -> Result<Box<dyn StreamingTranscriber>, EngineError>;
}
