//! Scripted transcriber for tests and engine-free demo runs.

use std::collections::VecDeque;

use crate::{StreamingTranscriber, TranscriberFactory, TranscriberOptions, TranscriberOutput};
use voxprint_foundation::EngineError;

#[derive(Debug, Clone)]
pub struct MockTranscriberConfig {
    pub sample_rate: u32,
    pub frame_length: usize,

    /// Output per `process` call as `(partial, is_endpoint)`; once the
    /// script runs out every further frame yields an empty, non-endpoint
    /// output.
    pub outputs: Vec<(String, bool)>,

    /// Text returned per `flush` call, consumed in order; extra flushes
    /// return an empty string.
    pub flush_texts: Vec<String>,

    /// Fail `process` after this many calls.
    pub fail_after: Option<usize>,
}

impl Default for MockTranscriberConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            frame_length: 512,
            outputs: Vec::new(),
            flush_texts: Vec::new(),
            fail_after: None,
        }
    }
}

pub struct MockTranscriber {
    config: MockTranscriberConfig,
    outputs: VecDeque<(String, bool)>,
    flush_texts: VecDeque<String>,
    process_calls: usize,
    flush_calls: usize,
}

impl MockTranscriber {
    pub fn new(config: MockTranscriberConfig) -> Self {
        let outputs = config.outputs.clone().into();
        let flush_texts = config.flush_texts.clone().into();
        Self {
            config,
            outputs,
            flush_texts,
            process_calls: 0,
            flush_calls: 0,
        }
    }

    pub fn process_calls(&self) -> usize {
        self.process_calls
    }

    pub fn flush_calls(&self) -> usize {
        self.flush_calls
    }
}

impl StreamingTranscriber for MockTranscriber {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn frame_length(&self) -> usize {
        self.config.frame_length
    }

    fn process(&mut self, frame: &[i16]) -> Result<TranscriberOutput, EngineError> {
        if frame.len() != self.config.frame_length {
            return Err(EngineError::InvalidArgument(format!(
                "expected {} samples per frame, got {}",
                self.config.frame_length,
                frame.len()
            )));
        }
        self.process_calls += 1;
        if let Some(limit) = self.config.fail_after {
            if self.process_calls > limit {
                return Err(EngineError::ProcessingFailed(
                    "simulated transcriber failure".to_string(),
                ));
            }
        }

        Ok(match self.outputs.pop_front() {
            Some((partial, is_endpoint)) => TranscriberOutput {
                partial,
                is_endpoint,
            },
            None => TranscriberOutput::default(),
        })
    }

    fn flush(&mut self) -> Result<String, EngineError> {
        self.flush_calls += 1;
        Ok(self.flush_texts.pop_front().unwrap_or_default())
    }
}

/// Factory wiring the scripted transcriber behind the vendor boundary.
pub struct MockTranscriberEngine {
    config: MockTranscriberConfig,
}

impl MockTranscriberEngine {
    pub fn new(config: MockTranscriberConfig) -> Self {
        Self { config }
    }
}

impl Default for MockTranscriberEngine {
    fn default() -> Self {
        Self::new(MockTranscriberConfig::default())
    }
}

impl TranscriberFactory for MockTranscriberEngine {
    fn create(
        &self,
        access_key: &str,
        options: &TranscriberOptions,
    ) -> Result<Box<dyn StreamingTranscriber>, EngineError> {
        if access_key.trim().is_empty() {
            return Err(EngineError::ActivationFailed(
                "access key is empty".to_string(),
            ));
        }
        if options.endpoint_duration_sec <= 0.0 {
            return Err(EngineError::InvalidArgument(
                "endpoint duration must be positive".to_string(),
            ));
        }
        Ok(Box::new(MockTranscriber::new(self.config.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Vec<i16> {
        vec![0i16; 512]
    }

    #[test]
    fn replays_script_then_goes_quiet() {
        let mut t = MockTranscriber::new(MockTranscriberConfig {
            outputs: vec![("hi".to_string(), false), (String::new(), true)],
            flush_texts: vec!["hi".to_string()],
            ..Default::default()
        });

        let first = t.process(&frame()).unwrap();
        assert_eq!(first.partial, "hi");
        assert!(!first.is_endpoint);

        let second = t.process(&frame()).unwrap();
        assert!(second.is_endpoint);
        assert_eq!(t.flush().unwrap(), "hi");

        assert_eq!(t.process(&frame()).unwrap(), TranscriberOutput::default());
        assert_eq!(t.flush().unwrap(), "");
    }

    #[test]
    fn rejects_wrong_frame_length() {
        let mut t = MockTranscriber::new(MockTranscriberConfig::default());
        assert!(matches!(
            t.process(&[0i16; 100]),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn factory_validates_options() {
        let engine = MockTranscriberEngine::default();
        let bad = TranscriberOptions {
            endpoint_duration_sec: 0.0,
            enable_punctuation: false,
        };
        assert!(engine.create("key", &bad).is_err());
        assert!(engine.create("", &TranscriberOptions::default()).is_err());
        assert!(engine.create("key", &TranscriberOptions::default()).is_ok());
    }
}
