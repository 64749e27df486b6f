use cpal::traits::{DeviceTrait, HostTrait};
use voxprint_foundation::AudioError;

/// Names of all input devices on the default host, in enumeration order.
/// The index into this list is the index accepted by [`CpalRecorder::open`].
///
/// [`CpalRecorder::open`]: crate::capture::CpalRecorder::open
pub fn list_input_devices() -> Result<Vec<String>, AudioError> {
    let host = cpal::default_host();
    let mut names = Vec::new();
    for device in host.input_devices()? {
        names.push(device_name(&device));
    }
    Ok(names)
}

/// Open an input device by enumeration index; `None` selects the host
/// default (the original surface used `-1` for this).
pub(crate) fn select_input_device(
    index: Option<usize>,
) -> Result<(cpal::Device, String), AudioError> {
    let host = cpal::default_host();
    let device = match index {
        Some(i) => host
            .input_devices()?
            .nth(i)
            .ok_or(AudioError::DeviceNotFound { index: Some(i) })?,
        None => host
            .default_input_device()
            .ok_or(AudioError::NoDevices)?,
    };
    let name = device_name(&device);
    Ok((device, name))
}

fn device_name(device: &cpal::Device) -> String {
    device.name().unwrap_or_else(|_| "<unknown>".to_string())
}
