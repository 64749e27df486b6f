//! Mock speaker engine for tests and engine-free demo runs.
//!
//! Deterministic and configurable: percentage advances by a fixed step per
//! enroll call, feedback follows a script, export returns fixed bytes, and
//! recognition returns one scripted score per profile. An activation limit
//! can be simulated to exercise the licensing error path.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    EnrollFeedback, EnrollUpdate, SpeakerEngineFactory, SpeakerProfile, SpeakerProfiler,
    SpeakerRecognizer,
};
use voxprint_foundation::EngineError;

#[derive(Debug, Clone)]
pub struct MockSpeakerConfig {
    pub version: String,
    pub sample_rate: u32,
    pub min_enroll_samples: usize,
    pub frame_length: usize,

    /// Cumulative percentage added per `enroll` call, capped at 100.
    pub step_percentage: f32,

    /// Feedback returned per `enroll` call; the last entry repeats.
    pub feedback_script: Vec<EnrollFeedback>,

    /// Bytes returned by `export`.
    pub profile_bytes: Vec<u8>,

    /// Score per profile index; missing entries fall back to 0.0.
    pub scores: Vec<f32>,

    /// Simulate the usage limit after this many `enroll` calls
    /// (`Some(0)` fails already at creation).
    pub activation_limit_after: Option<usize>,
}

impl Default for MockSpeakerConfig {
    fn default() -> Self {
        Self {
            version: "mock-1.0.0".to_string(),
            sample_rate: 16_000,
            min_enroll_samples: 48_000,
            frame_length: 512,
            step_percentage: 25.0,
            feedback_script: vec![EnrollFeedback::AudioOk],
            profile_bytes: b"voxprint mock profile".to_vec(),
            scores: Vec::new(),
            activation_limit_after: None,
        }
    }
}

/// Observations recorded by the mock engine, shared with the test that
/// constructed it.
#[derive(Debug, Clone, Default)]
pub struct MockJournal {
    inner: Arc<Mutex<JournalState>>,
}

#[derive(Debug, Default)]
struct JournalState {
    enroll_batch_lens: Vec<usize>,
    frames_scored: usize,
}

impl MockJournal {
    /// Sample count of every batch passed to `enroll`, in call order.
    pub fn enroll_batch_lens(&self) -> Vec<usize> {
        self.inner.lock().enroll_batch_lens.clone()
    }

    pub fn frames_scored(&self) -> usize {
        self.inner.lock().frames_scored
    }
}

pub struct MockProfiler {
    config: MockSpeakerConfig,
    journal: MockJournal,
    percentage: f32,
    enroll_calls: usize,
}

impl MockProfiler {
    pub fn new(config: MockSpeakerConfig) -> Self {
        Self {
            config,
            journal: MockJournal::default(),
            percentage: 0.0,
            enroll_calls: 0,
        }
    }

    pub fn with_journal(config: MockSpeakerConfig, journal: MockJournal) -> Self {
        Self {
            config,
            journal,
            percentage: 0.0,
            enroll_calls: 0,
        }
    }

    pub fn journal(&self) -> MockJournal {
        self.journal.clone()
    }
}

impl SpeakerProfiler for MockProfiler {
    fn version(&self) -> &str {
        &self.config.version
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn min_enroll_samples(&self) -> usize {
        self.config.min_enroll_samples
    }

    fn enroll(&mut self, samples: &[i16]) -> Result<EnrollUpdate, EngineError> {
        if let Some(limit) = self.config.activation_limit_after {
            if self.enroll_calls >= limit {
                return Err(EngineError::ActivationLimit);
            }
        }
        self.enroll_calls += 1;
        self.journal.inner.lock().enroll_batch_lens.push(samples.len());

        self.percentage = (self.percentage + self.config.step_percentage).min(100.0);
        let feedback = self
            .config
            .feedback_script
            .get(self.enroll_calls - 1)
            .or(self.config.feedback_script.last())
            .copied()
            .unwrap_or(EnrollFeedback::AudioOk);

        Ok(EnrollUpdate {
            percentage: self.percentage,
            feedback,
        })
    }

    fn export(&mut self) -> Result<SpeakerProfile, EngineError> {
        if self.percentage < 100.0 {
            return Err(EngineError::ProcessingFailed(
                "enrollment is not complete".to_string(),
            ));
        }
        Ok(SpeakerProfile::from_bytes(self.config.profile_bytes.clone()))
    }
}

pub struct MockRecognizer {
    config: MockSpeakerConfig,
    journal: MockJournal,
    num_profiles: usize,
}

impl MockRecognizer {
    pub fn new(config: MockSpeakerConfig, num_profiles: usize) -> Self {
        Self {
            config,
            journal: MockJournal::default(),
            num_profiles,
        }
    }

    pub fn journal(&self) -> MockJournal {
        self.journal.clone()
    }
}

impl SpeakerRecognizer for MockRecognizer {
    fn frame_length(&self) -> usize {
        self.config.frame_length
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn process(&mut self, frame: &[i16]) -> Result<Vec<f32>, EngineError> {
        if frame.len() != self.config.frame_length {
            return Err(EngineError::InvalidArgument(format!(
                "expected {} samples per frame, got {}",
                self.config.frame_length,
                frame.len()
            )));
        }
        self.journal.inner.lock().frames_scored += 1;

        Ok((0..self.num_profiles)
            .map(|i| self.config.scores.get(i).copied().unwrap_or(0.0))
            .collect())
    }
}

/// Factory wiring the mock engine behind the same boundary a vendor SDK
/// backend would use.
pub struct MockSpeakerEngine {
    config: MockSpeakerConfig,
    journal: MockJournal,
}

impl MockSpeakerEngine {
    pub fn new(config: MockSpeakerConfig) -> Self {
        Self {
            config,
            journal: MockJournal::default(),
        }
    }

    pub fn journal(&self) -> MockJournal {
        self.journal.clone()
    }
}

impl Default for MockSpeakerEngine {
    fn default() -> Self {
        Self::new(MockSpeakerConfig::default())
    }
}

impl SpeakerEngineFactory for MockSpeakerEngine {
    fn create_profiler(&self, access_key: &str) -> Result<Box<dyn SpeakerProfiler>, EngineError> {
        check_access_key(access_key)?;
        if self.config.activation_limit_after == Some(0) {
            return Err(EngineError::ActivationLimit);
        }
        Ok(Box::new(MockProfiler::with_journal(
            self.config.clone(),
            self.journal.clone(),
        )))
    }

    fn create_recognizer(
        &self,
        access_key: &str,
        profiles: &[SpeakerProfile],
    ) -> Result<Box<dyn SpeakerRecognizer>, EngineError> {
        check_access_key(access_key)?;
        if self.config.activation_limit_after == Some(0) {
            return Err(EngineError::ActivationLimit);
        }
        if profiles.iter().any(|p| p.is_empty()) {
            return Err(EngineError::InvalidArgument(
                "empty speaker profile".to_string(),
            ));
        }
        Ok(Box::new(MockRecognizer {
            config: self.config.clone(),
            journal: self.journal.clone(),
            num_profiles: profiles.len(),
        }))
    }
}

fn check_access_key(access_key: &str) -> Result<(), EngineError> {
    if access_key.trim().is_empty() {
        return Err(EngineError::ActivationFailed(
            "access key is empty".to_string(),
        ));
    }
    Ok(())
}
