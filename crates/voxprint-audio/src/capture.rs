use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::device::select_input_device;
use crate::ring_buffer::{sample_ring, SamplePopper, SamplePusher};
use voxprint_foundation::AudioError;

/// Frame size used for enrollment capture, matching the vendor recorder's
/// fixed frame length. The test loop uses the recognizer's own frame length
/// instead.
pub const DEFAULT_FRAME_LENGTH: usize = 512;

/// How long `read` waits without receiving a single sample before the
/// device is considered dead.
const STALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Boundary trait for fixed-frame microphone capture.
///
/// `read` blocks until one full frame is delivered and returns frames in
/// strict temporal order. Implementations own the device exclusively while
/// started and must release it in `stop` on every exit path.
pub trait Recorder {
    fn frame_length(&self) -> usize;
    fn sample_rate(&self) -> u32;
    fn selected_device(&self) -> &str;

    fn start(&mut self) -> Result<(), AudioError>;

    /// Fill `frame` completely with the next samples. `frame.len()` must
    /// equal `frame_length`.
    fn read(&mut self, frame: &mut [i16]) -> Result<(), AudioError>;

    fn stop(&mut self);
}

#[derive(Debug, Default)]
pub struct CaptureStats {
    pub frames_read: AtomicU64,
    pub samples_dropped: AtomicU64,
}

/// Microphone recorder backed by a cpal input stream.
///
/// The cpal callback converts incoming samples to mono i16 and pushes them
/// into a lock-free ring; `read` drains the ring on the caller's thread.
pub struct CpalRecorder {
    device: cpal::Device,
    device_label: String,
    stream_config: StreamConfig,
    sample_format: SampleFormat,
    frame_length: usize,
    stream: Option<Stream>,
    pusher: Option<SamplePusher>,
    popper: SamplePopper,
    stats: Arc<CaptureStats>,
    failed: Arc<AtomicBool>,
}

impl CpalRecorder {
    /// Open an input device for `frame_length`-sample frames at exactly
    /// `sample_rate` Hz. `device_index` of `None` selects the host default.
    ///
    /// No resampling is performed: a device that cannot deliver the engine
    /// sample rate in i16 or f32 fails with `FormatNotSupported`.
    pub fn open(
        frame_length: usize,
        sample_rate: u32,
        device_index: Option<usize>,
    ) -> Result<Self, AudioError> {
        let (device, device_label) = select_input_device(device_index)?;
        let (stream_config, sample_format) = pick_config(&device, sample_rate)?;

        // One second of audio between the callback and the reader.
        let (pusher, popper) = sample_ring(sample_rate as usize);

        tracing::info!(
            "Opened input device '{}' ({} Hz, {} ch, {:?})",
            device_label,
            stream_config.sample_rate.0,
            stream_config.channels,
            sample_format,
        );

        Ok(Self {
            device,
            device_label,
            stream_config,
            sample_format,
            frame_length,
            stream: None,
            pusher: Some(pusher),
            popper,
            stats: Arc::new(CaptureStats::default()),
            failed: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn stats(&self) -> Arc<CaptureStats> {
        Arc::clone(&self.stats)
    }

    fn build_stream(&mut self, pusher: SamplePusher) -> Result<Stream, AudioError> {
        let stats = Arc::clone(&self.stats);
        let failed = Arc::clone(&self.failed);
        let channels = self.stream_config.channels as usize;

        let err_fn = move |err: cpal::StreamError| {
            tracing::error!("Audio stream error: {}", err);
            failed.store(true, Ordering::SeqCst);
        };

        // Shared sink for both sample formats: downmix interleaved input to
        // the first channel, then push one chunk into the ring.
        let mut pusher = pusher;
        let mut mono_scratch: Vec<i16> = Vec::new();
        let mut ingest = move |samples: &[i16]| {
            let mono: &[i16] = if channels > 1 {
                mono_scratch.clear();
                mono_scratch.extend(samples.iter().step_by(channels));
                &mono_scratch
            } else {
                samples
            };
            if !pusher.push(mono) {
                stats
                    .samples_dropped
                    .fetch_add(mono.len() as u64, Ordering::Relaxed);
                tracing::warn!("Capture ring full, dropped {} samples", mono.len());
            }
        };

        let stream = match self.sample_format {
            SampleFormat::I16 => self.device.build_input_stream(
                &self.stream_config,
                move |data: &[i16], _: &_| ingest(data),
                err_fn,
                None,
            )?,
            SampleFormat::F32 => {
                let mut convert_scratch: Vec<i16> = Vec::new();
                self.device.build_input_stream(
                    &self.stream_config,
                    move |data: &[f32], _: &_| {
                        convert_scratch.clear();
                        convert_scratch.reserve(data.len());
                        // Clamp [-1.0, 1.0] and scale to i16
                        for &s in data {
                            let clamped = s.clamp(-1.0, 1.0);
                            convert_scratch.push((clamped * 32767.0).round() as i16);
                        }
                        ingest(&convert_scratch);
                    },
                    err_fn,
                    None,
                )?
            }
            other => {
                return Err(AudioError::FormatNotSupported {
                    format: format!("{:?}", other),
                });
            }
        };

        Ok(stream)
    }
}

impl Recorder for CpalRecorder {
    fn frame_length(&self) -> usize {
        self.frame_length
    }

    fn sample_rate(&self) -> u32 {
        self.stream_config.sample_rate.0
    }

    fn selected_device(&self) -> &str {
        &self.device_label
    }

    fn start(&mut self) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }
        // The ring producer moves into the stream callback; the recorder is
        // single-shot and cannot be restarted after `stop`.
        let pusher = self
            .pusher
            .take()
            .ok_or_else(|| AudioError::Fatal("recorder cannot be restarted".to_string()))?;
        let stream = self.build_stream(pusher)?;
        stream.play()?;
        self.stream = Some(stream);
        tracing::debug!("Capture started on '{}'", self.device_label);
        Ok(())
    }

    fn read(&mut self, frame: &mut [i16]) -> Result<(), AudioError> {
        if self.stream.is_none() {
            return Err(AudioError::NotStarted);
        }

        let mut filled = 0;
        let mut last_progress = Instant::now();
        while filled < frame.len() {
            if self.failed.load(Ordering::SeqCst) {
                return Err(AudioError::Fatal(
                    "audio stream reported an error".to_string(),
                ));
            }
            let n = self.popper.pop_into(&mut frame[filled..]);
            if n == 0 {
                if last_progress.elapsed() > STALL_TIMEOUT {
                    return Err(AudioError::DeviceStalled);
                }
                thread::sleep(Duration::from_millis(2));
            } else {
                filled += n;
                last_progress = Instant::now();
            }
        }

        self.stats.frames_read.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::debug!("Capture stopped on '{}'", self.device_label);
        }
    }
}

/// Pick a supported input config at exactly the requested rate, preferring
/// i16 over f32 and fewer channels over more.
fn pick_config(
    device: &cpal::Device,
    sample_rate: u32,
) -> Result<(StreamConfig, SampleFormat), AudioError> {
    let requested = cpal::SampleRate(sample_rate);

    let mut best: Option<(StreamConfig, SampleFormat)> = None;
    for range in device.supported_input_configs()? {
        if range.min_sample_rate() > requested || range.max_sample_rate() < requested {
            continue;
        }
        let format = range.sample_format();
        if format != SampleFormat::I16 && format != SampleFormat::F32 {
            continue;
        }
        let config = StreamConfig {
            channels: range.channels(),
            sample_rate: requested,
            buffer_size: cpal::BufferSize::Default,
        };
        let better = match &best {
            None => true,
            Some((current, current_format)) => {
                let format_rank = |f: SampleFormat| if f == SampleFormat::I16 { 0 } else { 1 };
                (format_rank(format), config.channels)
                    < (format_rank(*current_format), current.channels)
            }
        };
        if better {
            best = Some((config, format));
        }
    }

    best.ok_or_else(|| AudioError::FormatNotSupported {
        format: format!("{} Hz mono i16/f32 input", sample_rate),
    })
}

#[cfg(test)]
mod convert_tests {
    #[test]
    fn f32_to_i16_clamps_and_rounds() {
        let src = [-2.0f32, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0];
        let out: Vec<i16> = src
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0).round() as i16)
            .collect();
        assert_eq!(&out, &[-32767, -32767, -16384, 0, 16384, 32767, 32767]);
    }

    #[test]
    fn interleaved_downmix_takes_first_channel() {
        let stereo = [10i16, -10, 20, -20, 30, -30];
        let mono: Vec<i16> = stereo.iter().step_by(2).copied().collect();
        assert_eq!(&mono, &[10, 20, 30]);
    }
}
