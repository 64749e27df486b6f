//! Command-line surface of the `voxprint` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use voxprint_foundation::AppError;
use voxprint_stt::TranscriberOptions;

#[derive(Debug, Parser)]
#[command(name = "voxprint", version, about = "Speaker enrollment and live recognition demo")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available audio input devices and exit
    Devices,
    /// Enroll a new speaker profile from live microphone audio
    Enroll(EnrollArgs),
    /// Stream live audio, scoring it against every saved profile
    Test(TestArgs),
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// AccessKey for the speech engines
    #[arg(long, env = "VOXPRINT_ACCESS_KEY", hide_env_values = true)]
    pub access_key: String,

    /// Input device index; -1 selects the system default
    #[arg(long, default_value_t = -1)]
    pub device: i32,

    /// Directory holding saved speaker profiles
    #[arg(long, default_value = "profiles")]
    pub profile_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct EnrollArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Label for the new speaker profile
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct TestArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Mirror captured audio into a timestamped WAV file
    #[arg(long)]
    pub record_audio: bool,

    /// Directory for session recordings
    #[arg(long, default_value = "audio")]
    pub audio_dir: PathBuf,

    /// Trailing silence (seconds) before an utterance endpoint
    #[arg(long, default_value_t = 1.0)]
    pub endpoint_duration_sec: f32,

    /// Enable automatic punctuation in transcripts
    #[arg(long)]
    pub punctuation: bool,
}

/// Validated settings shared by the enroll and test actions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub access_key: String,
    pub device_index: Option<usize>,
    pub profile_dir: PathBuf,
}

impl SessionConfig {
    pub fn from_args(args: &CommonArgs) -> Result<Self, AppError> {
        if args.access_key.trim().is_empty() {
            return Err(AppError::Config("access key must not be empty".to_string()));
        }
        let device_index = match args.device {
            -1 => None,
            idx if idx >= 0 => Some(idx as usize),
            idx => {
                return Err(AppError::Config(format!(
                    "invalid device index {idx}; use -1 for the default device"
                )))
            }
        };
        Ok(Self {
            access_key: args.access_key.clone(),
            device_index,
            profile_dir: args.profile_dir.clone(),
        })
    }
}

impl TestArgs {
    pub fn transcriber_options(&self) -> Result<TranscriberOptions, AppError> {
        if !self.endpoint_duration_sec.is_finite() || self.endpoint_duration_sec <= 0.0 {
            return Err(AppError::Config(format!(
                "endpoint duration must be positive, got {}",
                self.endpoint_duration_sec
            )));
        }
        Ok(TranscriberOptions {
            endpoint_duration_sec: self.endpoint_duration_sec,
            enable_punctuation: self.punctuation,
        })
    }
}
