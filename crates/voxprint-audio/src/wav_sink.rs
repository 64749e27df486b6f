//! Best-effort per-session WAV recording.
//!
//! The test loop can mirror every captured frame into a mono 16-bit PCM
//! file for later inspection. Recording is strictly optional: any failure
//! is logged and the sink goes quiet, it never aborts the recognition loop.

use chrono::Local;
use hound::{WavSpec, WavWriter};
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub struct WavSink {
    writer: Option<WavWriter<BufWriter<File>>>,
    path: Option<PathBuf>,
}

impl WavSink {
    /// Open `<dir>/<YYYYMMDD_HHMMSS>.wav` at the given sample rate.
    ///
    /// Never fails: on any error the sink is returned disabled, with the
    /// cause logged once.
    pub fn open(dir: &Path, sample_rate: u32) -> Self {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let path = dir.join(format!("{}.wav", Local::now().format("%Y%m%d_%H%M%S")));

        let writer = fs::create_dir_all(dir)
            .map_err(|e| e.to_string())
            .and_then(|_| WavWriter::create(&path, spec).map_err(|e| e.to_string()));

        match writer {
            Ok(writer) => {
                tracing::info!("Recording session audio to {}", path.display());
                Self {
                    writer: Some(writer),
                    path: Some(path),
                }
            }
            Err(e) => {
                tracing::warn!("Session recording disabled: {}", e);
                Self {
                    writer: None,
                    path: None,
                }
            }
        }
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self {
            writer: None,
            path: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one frame. On a write error the sink disables itself.
    pub fn append(&mut self, frame: &[i16]) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        for &sample in frame {
            if let Err(e) = writer.write_sample(sample) {
                tracing::warn!("Session recording stopped: {}", e);
                self.writer = None;
                return;
            }
        }
    }

    /// Flush the header and close the file. Returns the recording path if
    /// one was written.
    pub fn finalize(mut self) -> Option<PathBuf> {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                tracing::warn!("Failed to finalize session recording: {}", e);
                return None;
            }
        }
        self.path.take()
    }
}
