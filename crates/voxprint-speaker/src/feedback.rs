use voxprint_foundation::EngineError;

/// Feedback classification returned by the profiler for each enrollment
/// step. The set is fixed by the engine; the message mapping is total over
/// these five codes and an out-of-range raw code is a hard error, never a
/// silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollFeedback {
    AudioOk,
    AudioTooShort,
    UnknownSpeaker,
    NoVoiceFound,
    QualityIssue,
}

impl EnrollFeedback {
    pub const ALL: [EnrollFeedback; 5] = [
        EnrollFeedback::AudioOk,
        EnrollFeedback::AudioTooShort,
        EnrollFeedback::UnknownSpeaker,
        EnrollFeedback::NoVoiceFound,
        EnrollFeedback::QualityIssue,
    ];

    /// Map a raw engine feedback code onto the enum.
    pub fn from_code(code: i32) -> Result<Self, EngineError> {
        match code {
            0 => Ok(EnrollFeedback::AudioOk),
            1 => Ok(EnrollFeedback::AudioTooShort),
            2 => Ok(EnrollFeedback::UnknownSpeaker),
            3 => Ok(EnrollFeedback::NoVoiceFound),
            4 => Ok(EnrollFeedback::QualityIssue),
            other => Err(EngineError::UnknownFeedback(other)),
        }
    }

    /// Human-readable description shown next to the enrollment percentage.
    pub fn message(&self) -> &'static str {
        match self {
            EnrollFeedback::AudioOk => "Good audio",
            EnrollFeedback::AudioTooShort => "Insufficient audio length",
            EnrollFeedback::UnknownSpeaker => "Different speaker in audio",
            EnrollFeedback::NoVoiceFound => "No voice found in audio",
            EnrollFeedback::QualityIssue => {
                "Low audio quality due to bad microphone or environment"
            }
        }
    }
}

impl std::fmt::Display for EnrollFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_total_over_defined_codes() {
        for code in 0..5 {
            let feedback = EnrollFeedback::from_code(code).unwrap();
            assert!(!feedback.message().is_empty());
        }
        assert_eq!(EnrollFeedback::ALL.len(), 5);
    }

    #[test]
    fn undefined_code_is_an_error() {
        for code in [-1, 5, 42] {
            match EnrollFeedback::from_code(code) {
                Err(EngineError::UnknownFeedback(c)) => assert_eq!(c, code),
                other => panic!("expected UnknownFeedback, got {:?}", other),
            }
        }
    }

    #[test]
    fn messages_are_distinct() {
        for a in EnrollFeedback::ALL {
            for b in EnrollFeedback::ALL {
                if a != b {
                    assert_ne!(a.message(), b.message());
                }
            }
        }
    }
}
