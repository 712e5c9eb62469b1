use super::interface::{CaptureDevice, CaptureOptions, PreviewStream};
use crate::config::CameraConfig;
use crate::error::CameraError;
use crate::frame::{FrameData, FrameFormat};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, trace};

/// Synthetic capture device producing a moving colour gradient
pub struct TestPatternCamera {
    resolution: (u32, u32),
    streams_opened: AtomicU64,
}

impl TestPatternCamera {
    pub fn new(resolution: (u32, u32)) -> Self {
        Self {
            resolution,
            streams_opened: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.resolution)
    }

    pub fn streams_opened(&self) -> u64 {
        self.streams_opened.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CaptureDevice for TestPatternCamera {
    async fn request_capture(
        &self,
        options: &CaptureOptions,
    ) -> Result<Arc<dyn PreviewStream>, CameraError> {
        if !options.video {
            return Err(CameraError::Configuration {
                details: "test pattern camera only provides video".to_string(),
            });
        }

        let (width, height) = self.resolution;
        if width == 0 || height == 0 {
            return Err(CameraError::Configuration {
                details: format!("invalid resolution {}x{}", width, height),
            });
        }

        let index = self.streams_opened.fetch_add(1, Ordering::Relaxed);
        info!("Opened test pattern stream {} ({}x{})", index, width, height);

        Ok(Arc::new(TestPatternStream {
            source: format!("test-pattern:{}", index),
            width,
            height,
            frame_counter: AtomicU64::new(0),
        }))
    }
}

struct TestPatternStream {
    source: String,
    width: u32,
    height: u32,
    frame_counter: AtomicU64,
}

#[async_trait]
impl PreviewStream for TestPatternStream {
    fn source(&self) -> &str {
        &self.source
    }

    async fn current_frame(&self) -> Result<FrameData, CameraError> {
        let frame_id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        let shift = (frame_id % 256) as u32;

        let mut data = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                data.push(((x * 255 / self.width.max(1) + shift) % 256) as u8);
                data.push(((y * 255 / self.height.max(1) + shift) % 256) as u8);
                data.push(((x + y + shift) % 256) as u8);
            }
        }

        trace!("Generated test pattern frame {} on {}", frame_id, self.source);
        Ok(FrameData::new(
            frame_id,
            SystemTime::now(),
            data,
            self.width,
            self.height,
            FrameFormat::Rgb24,
        ))
    }
}
