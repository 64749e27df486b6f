//! Transcript accumulation for one test session.

/// Result of feeding one frame to the transcription engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriberOutput {
    /// Partial transcript delta; empty when the frame added nothing.
    pub partial: String,
    /// True when the engine detected the end of an utterance.
    pub is_endpoint: bool,
}

/// Running transcript of a recognition session.
///
/// Flush policy: when the engine flags an endpoint, the caller flushes the
/// engine and commits the returned text here as a completed utterance,
/// which also resets the partial line. The caller flushes once more when
/// the loop exits so a trailing utterance is not lost. Earlier revisions
/// disagreed on this; the policy is now fixed.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    partial: String,
    utterances: Vec<String>,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a non-empty partial delta to the current partial line.
    pub fn push_partial(&mut self, text: &str) {
        if !text.is_empty() {
            self.partial.push_str(text);
        }
    }

    /// Commit flushed text as a completed utterance and reset the partial
    /// line. Empty flush output still resets the partial line but records
    /// no utterance.
    pub fn commit(&mut self, flushed: String) {
        self.partial.clear();
        if !flushed.is_empty() {
            tracing::debug!("Utterance complete: {:?}", flushed);
            self.utterances.push(flushed);
        }
    }

    /// Current partial line (text since the last endpoint).
    pub fn partial(&self) -> &str {
        &self.partial
    }

    /// Completed utterances, in order.
    pub fn utterances(&self) -> &[String] {
        &self.utterances
    }

    /// Everything heard so far: completed utterances plus the pending
    /// partial line.
    pub fn full_text(&self) -> String {
        let mut parts: Vec<&str> = self.utterances.iter().map(String::as_str).collect();
        if !self.partial.is_empty() {
            parts.push(&self.partial);
        }
        parts.join(" ")
    }
}
