use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Audio subsystem error: {0}")]
    Audio(#[from] AudioError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Input device not found: index {index:?}")]
    DeviceNotFound { index: Option<usize> },

    #[error("No audio input devices available")]
    NoDevices,

    #[error("Format not supported: {format}")]
    FormatNotSupported { format: String },

    #[error("Device stopped delivering audio")]
    DeviceStalled,

    #[error("Recorder is not started")]
    NotStarted,

    #[error("CPAL error: {0}")]
    Cpal(#[from] cpal::StreamError),

    #[error("Build stream error: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Play stream error: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Device enumeration error: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("Supported stream configs error: {0}")]
    SupportedStreamConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

/// Failures reported by the external engine boundaries (speaker profiler,
/// speaker recognizer, streaming transcriber). The engines themselves are
/// opaque; these variants cover the failure surface their APIs expose.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("AccessKey has reached its processing limit")]
    ActivationLimit,

    #[error("AccessKey refused by engine: {0}")]
    ActivationFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown enrollment feedback code: {0}")]
    UnknownFeedback(i32),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

impl EngineError {
    /// True when the failure is a usage-limit / licensing condition rather
    /// than a processing fault. Callers render these as a terminal message
    /// for the current operation without treating the process as broken.
    pub fn is_activation(&self) -> bool {
        matches!(
            self,
            EngineError::ActivationLimit | EngineError::ActivationFailed(_)
        )
    }
}
