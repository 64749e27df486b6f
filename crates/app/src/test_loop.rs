//! Blocking driver for the test action: live recognition plus streaming
//! transcription over the same frames.

use std::io::Write as _;
use std::path::PathBuf;

use voxprint_audio::{Recorder, WavSink};
use voxprint_foundation::{EngineError, StopFlag};
use voxprint_speaker::SpeakerRecognizer;
use voxprint_stt::{StreamingTranscriber, TranscriptLog};

/// What a test session produced before it stopped.
#[derive(Debug)]
pub struct TestSummary {
    pub frames_processed: u64,
    pub utterances: Vec<String>,
    /// Path of the session recording, when one was requested and written.
    pub recording: Option<PathBuf>,
}

/// Render one score line, one entry per profile in load order.
pub fn format_scores(labels: &[String], scores: &[f32]) -> String {
    labels
        .iter()
        .zip(scores)
        .map(|(label, score)| format!("`{label}`: {score:.2}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the recognition loop until the stop flag fires or a device or
/// engine error ends the session.
///
/// Every frame goes to the recorder sink (best effort), the transcriber,
/// and the recognizer, in that order. An endpoint flushes the transcriber
/// and commits the flushed text as a completed utterance; one final flush
/// on exit catches a trailing utterance. The recorder is stopped and the
/// WAV file finalized on every exit path.
pub fn run_test(
    recorder: &mut dyn Recorder,
    recognizer: &mut dyn SpeakerRecognizer,
    transcriber: &mut dyn StreamingTranscriber,
    labels: &[String],
    mut wav: WavSink,
    stop: &StopFlag,
) -> anyhow::Result<TestSummary> {
    let mut frame = vec![0i16; recorder.frame_length()];
    let mut log = TranscriptLog::new();
    let mut frames_processed = 0u64;

    recorder.start()?;
    let result = (|| -> anyhow::Result<()> {
        while !stop.is_stopped() {
            recorder.read(&mut frame)?;
            wav.append(&frame);

            let output = transcriber.process(&frame)?;
            if !output.partial.is_empty() {
                log.push_partial(&output.partial);
                println!("text: {}", log.partial());
            }
            if output.is_endpoint {
                let flushed = transcriber.flush()?;
                if !flushed.is_empty() {
                    println!(">> {flushed}");
                }
                log.commit(flushed);
            }

            let scores = recognizer.process(&frame)?;
            if scores.len() != labels.len() {
                return Err(EngineError::ProcessingFailed(format!(
                    "engine returned {} scores for {} profiles",
                    scores.len(),
                    labels.len()
                ))
                .into());
            }
            print!("\rscores -> {}", format_scores(labels, &scores));
            std::io::stdout().flush().ok();

            frames_processed += 1;
        }

        // Trailing utterance after the last endpoint.
        let flushed = transcriber.flush()?;
        if !flushed.is_empty() {
            println!("\n>> {flushed}");
        }
        log.commit(flushed);
        Ok(())
    })();
    recorder.stop();
    println!();
    let recording = wav.finalize();

    result?;
    tracing::info!(
        "Test session ended: {} frames, {} utterances",
        frames_processed,
        log.utterances().len()
    );
    Ok(TestSummary {
        frames_processed,
        utterances: log.utterances().to_vec(),
        recording,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_line_follows_label_order() {
        let labels = vec!["alice".to_string(), "bob".to_string()];
        assert_eq!(
            format_scores(&labels, &[0.9, 0.1]),
            "`alice`: 0.90, `bob`: 0.10"
        );
    }

    #[test]
    fn score_line_for_single_profile() {
        let labels = vec!["carol".to_string()];
        assert_eq!(format_scores(&labels, &[0.0]), "`carol`: 0.00");
    }
}
