use super::interface::{CaptureDevice, CaptureOptions, PreviewStream};
use crate::config::CameraConfig;
use crate::error::CameraError;
use crate::frame::{pack_rows, FrameData, FrameFormat};
use async_trait::async_trait;
use gstreamer::prelude::*;
use gstreamer::Pipeline;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, trace, warn};

const PULL_TIMEOUT_SECONDS: u64 = 2;

/// V4L2 camera read through a GStreamer pipeline converting to RGBA
pub struct GstCamera {
    config: CameraConfig,
    streams_opened: AtomicU64,
}

impl GstCamera {
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        gstreamer::init().map_err(|e| CameraError::Configuration {
            details: format!("Failed to initialize GStreamer: {}", e),
        })?;

        Ok(Self {
            config,
            streams_opened: AtomicU64::new(0),
        })
    }

    fn build_pipeline_string(&self) -> String {
        let (width, height) = self.config.resolution;
        format!(
            "v4l2src device=/dev/video{} ! \
             videoconvert ! videoscale ! \
             video/x-raw,format=RGBA,width={},height={},framerate={}/1 ! \
             appsink name=sink sync=false max-buffers=1 drop=true",
            self.config.index, width, height, self.config.fps
        )
    }
}

#[async_trait]
impl CaptureDevice for GstCamera {
    async fn request_capture(
        &self,
        options: &CaptureOptions,
    ) -> Result<Arc<dyn PreviewStream>, CameraError> {
        if !options.video {
            return Err(CameraError::Configuration {
                details: "video track is required for preview".to_string(),
            });
        }
        if options.audio {
            debug!("Audio track requested; preview pipeline carries video only");
        }

        let pipeline_desc = self.build_pipeline_string();
        info!("Creating GStreamer pipeline: {}", pipeline_desc);

        let pipeline = gstreamer::parse::launch(&pipeline_desc)
            .map_err(|e| CameraError::Configuration {
                details: format!("Failed to create pipeline: {}", e),
            })?
            .downcast::<Pipeline>()
            .map_err(|_| CameraError::Configuration {
                details: "Failed to downcast to Pipeline".to_string(),
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| CameraError::Configuration {
                details: "Pipeline has no appsink".to_string(),
            })?
            .downcast::<AppSink>()
            .map_err(|_| CameraError::Configuration {
                details: "Failed to downcast to AppSink".to_string(),
            })?;

        pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| CameraError::Unavailable {
                details: format!("Failed to start pipeline: {}", e),
            })?;

        let index = self.streams_opened.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(GstStream {
            source: format!("v4l2:/dev/video{}#{}", self.config.index, index),
            pipeline,
            appsink,
            frame_counter: AtomicU64::new(0),
        }))
    }
}

struct GstStream {
    source: String,
    pipeline: Pipeline,
    appsink: AppSink,
    frame_counter: AtomicU64,
}

#[async_trait]
impl PreviewStream for GstStream {
    fn source(&self) -> &str {
        &self.source
    }

    async fn current_frame(&self) -> Result<FrameData, CameraError> {
        let appsink = self.appsink.clone();
        let sample = tokio::task::spawn_blocking(move || {
            appsink.try_pull_sample(gstreamer::ClockTime::from_seconds(PULL_TIMEOUT_SECONDS))
        })
        .await
        .map_err(|e| CameraError::CaptureStream {
            details: format!("Frame pull task failed: {}", e),
        })?
        .ok_or_else(|| CameraError::CaptureStream {
            details: "No frame received from camera".to_string(),
        })?;

        let buffer = sample.buffer().ok_or_else(|| CameraError::CaptureStream {
            details: "No buffer in sample".to_string(),
        })?;
        let caps = sample.caps().ok_or_else(|| CameraError::CaptureStream {
            details: "No caps in sample".to_string(),
        })?;
        let video_info = VideoInfo::from_caps(caps).map_err(|e| CameraError::CaptureStream {
            details: format!("Failed to get video info: {}", e),
        })?;
        let map = buffer
            .map_readable()
            .map_err(|e| CameraError::CaptureStream {
                details: format!("Failed to map buffer: {}", e),
            })?;

        let width = video_info.width();
        let height = video_info.height();
        let data = pack_rows(
            map.as_slice(),
            video_info.stride()[0],
            width,
            height,
            FrameFormat::Rgba8,
        )?;

        let frame_id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        trace!("Pulled RGBA frame {} ({}x{})", frame_id, width, height);

        Ok(FrameData::new(
            frame_id,
            SystemTime::now(),
            data,
            width,
            height,
            FrameFormat::Rgba8,
        ))
    }
}

impl Drop for GstStream {
    fn drop(&mut self) {
        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!("Failed to stop pipeline for {}: {}", self.source, e);
        }
    }
}
