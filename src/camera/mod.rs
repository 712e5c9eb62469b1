#[cfg(all(feature = "camera", target_os = "linux"))]
mod gst;
mod interface;
mod test_pattern;

#[cfg(all(feature = "camera", target_os = "linux"))]
pub use gst::GstCamera;
pub use interface::{CaptureDevice, CaptureOptions, PreviewElement, PreviewStream};
pub use test_pattern::TestPatternCamera;
