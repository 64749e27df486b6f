//! Speaker enrollment and recognition boundary for VoxPrint.
//!
//! The actual voice-embedding engine is an opaque vendor component. This
//! crate defines the traits the rest of the application talks to, the
//! enrollment orchestration around them, and the on-disk profile store.
//! A deterministic mock backend lives in [`mock`]; real vendor backends
//! implement the same traits out of tree.

pub mod enrollment;
pub mod feedback;
pub mod mock;
pub mod store;

pub use enrollment::{EnrollmentSession, EnrollmentState, NullProgress, ProgressSink};
pub use feedback::EnrollFeedback;
pub use store::{validate_label, ProfileStore, StoreError, PROFILE_EXT};

use voxprint_foundation::EngineError;

/// Opaque serialized representation of a speaker's voice characteristics.
/// Produced by [`SpeakerProfiler::export`], persisted verbatim, and loaded
/// back byte-for-byte. Never interpreted by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerProfile(Vec<u8>);

impl SpeakerProfile {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One enrollment step result: the engine's cumulative percentage (taken
/// verbatim, never recomputed locally) and its feedback classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrollUpdate {
    pub percentage: f32,
    pub feedback: EnrollFeedback,
}

/// Enrollment side of the speaker engine.
pub trait SpeakerProfiler {
    fn version(&self) -> &str;

    fn sample_rate(&self) -> u32;

    /// Minimum number of samples the engine wants per enrollment step.
    fn min_enroll_samples(&self) -> usize;

    /// Submit one accumulated batch. The returned percentage is cumulative
    /// and monotonically non-decreasing per the engine contract.
    fn enroll(&mut self, samples: &[i16]) -> Result<EnrollUpdate, EngineError>;

    /// Serialize the completed profile. Only meaningful once enrollment
    /// has reached 100%.
    fn export(&mut self) -> Result<SpeakerProfile, EngineError>;
}

/// Recognition side of the speaker engine, built over a fixed set of
/// profiles.
pub trait SpeakerRecognizer {
    fn frame_length(&self) -> usize;

    fn sample_rate(&self) -> u32;

    /// Score one frame against every loaded profile. The result has one
    /// entry per profile, in the order the profiles were supplied.
    fn process(&mut self, frame: &[i16]) -> Result<Vec<f32>, EngineError>;
}

/// Constructor boundary for speaker engines. The mock backend implements
/// this in-tree; vendor SDK backends plug in behind the same factory.
pub trait SpeakerEngineFactory {
    fn create_profiler(&self, access_key: &str) -> Result<Box<dyn SpeakerProfiler>, EngineError>;

    fn create_recognizer(
        &self,
        access_key: &str,
        profiles: &[SpeakerProfile],
    ) -> Result<Box<dyn SpeakerRecognizer>, EngineError>;
}
