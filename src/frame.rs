use crate::error::{CameraError, CaptureError};
use image::{RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

/// Frame format enumeration supporting different video formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    /// RGB24 format - uncompressed RGB data
    Rgb24,
    /// RGBA format - uncompressed RGB data with alpha
    Rgba8,
}

impl FrameFormat {
    /// Get bytes per pixel for the format
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Rgb24 => 3,
            FrameFormat::Rgba8 => 4,
        }
    }
}

/// Copy `height` rows of `width` pixels out of a buffer whose rows are
/// `stride` bytes apart, dropping any row padding.
pub fn pack_rows(
    data: &[u8],
    stride: i32,
    width: u32,
    height: u32,
    format: FrameFormat,
) -> Result<Vec<u8>, CameraError> {
    let row_len = width as usize * format.bytes_per_pixel();
    let stride = usize::try_from(stride).map_err(|_| CameraError::CaptureStream {
        details: format!("Negative row stride {}", stride),
    })?;
    if stride < row_len {
        return Err(CameraError::CaptureStream {
            details: format!("Row stride {} is shorter than a {} byte row", stride, row_len),
        });
    }

    let rows = height as usize;
    let needed = match rows {
        0 => 0,
        n => stride * (n - 1) + row_len,
    };
    if data.len() < needed {
        return Err(CameraError::CaptureStream {
            details: format!("Frame buffer has {} bytes, expected at least {}", data.len(), needed),
        });
    }

    if stride == row_len {
        return Ok(data[..row_len * rows].to_vec());
    }

    let mut packed = Vec::with_capacity(row_len * rows);
    for row in 0..rows {
        let start = row * stride;
        packed.extend_from_slice(&data[start..start + row_len]);
    }
    Ok(packed)
}

/// A single frame grabbed from the live stream
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Frame identifier, increasing per stream
    pub id: u64,
    /// Timestamp when frame was captured
    pub timestamp: SystemTime,
    /// Raw frame data (shared ownership for efficiency)
    pub data: Arc<Vec<u8>>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frame format
    pub format: FrameFormat,
}

impl FrameData {
    /// Create a new frame data instance
    pub fn new(
        id: u64,
        timestamp: SystemTime,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Self {
        Self {
            id,
            timestamp,
            data: Arc::new(data),
            width,
            height,
            format,
        }
    }

    /// Get the expected frame size in bytes
    pub fn expected_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    /// Validate frame data size against expected size
    pub fn validate_size(&self) -> bool {
        self.data.len() == self.expected_size()
    }

    /// Decode the frame into an RGBA image
    pub fn to_rgba_image(&self) -> Result<RgbaImage, CaptureError> {
        if !self.validate_size() {
            return Err(CaptureError::UnsupportedFrame {
                details: format!(
                    "frame {} has {} bytes, expected {}",
                    self.id,
                    self.data.len(),
                    self.expected_size()
                ),
            });
        }

        match self.format {
            FrameFormat::Rgba8 => {
                RgbaImage::from_raw(self.width, self.height, self.data.as_ref().clone())
                    .ok_or_else(|| CaptureError::UnsupportedFrame {
                        details: format!("frame {} is not a valid RGBA buffer", self.id),
                    })
            }
            FrameFormat::Rgb24 => {
                let rgb = RgbImage::from_raw(self.width, self.height, self.data.as_ref().clone())
                    .ok_or_else(|| CaptureError::UnsupportedFrame {
                        details: format!("frame {} is not a valid RGB buffer", self.id),
                    })?;
                Ok(image::DynamicImage::ImageRgb8(rgb).to_rgba8())
            }
        }
    }
}
