pub mod device;
pub mod enumerate;
#[cfg(test)]
pub mod fake;
pub mod ffmpeg;

pub use device::{CaptureDevice, CaptureStream, Clip};
pub use enumerate::enumerate_devices;
pub use ffmpeg::{CaptureSettings, FfmpegCamera};
