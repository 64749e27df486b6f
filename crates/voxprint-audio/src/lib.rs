pub mod capture;
pub mod device;
pub mod ring_buffer;
pub mod scripted;
pub mod wav_sink;

pub use capture::{CpalRecorder, Recorder, DEFAULT_FRAME_LENGTH};
pub use device::list_input_devices;
pub use scripted::{ScriptedRecorder, WhenExhausted};
pub use wav_sink::WavSink;
