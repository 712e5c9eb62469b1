use crate::error::CameraError;
use crate::frame::FrameData;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Tracks requested from the capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    pub audio: bool,
    pub video: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// A device able to open a live preview stream
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn request_capture(
        &self,
        options: &CaptureOptions,
    ) -> Result<Arc<dyn PreviewStream>, CameraError>;
}

/// An open live stream
#[async_trait]
pub trait PreviewStream: Send + Sync {
    /// Identifier of the stream, used to re-attach a preview to it
    fn source(&self) -> &str;

    /// The frame currently shown by the stream
    async fn current_frame(&self) -> Result<FrameData, CameraError>;
}

/// The controller's attachment to a stream. Detaching drops the element;
/// a new one is created from the same stream when the preview comes back.
pub struct PreviewElement {
    stream: Arc<dyn PreviewStream>,
    playing: bool,
}

impl PreviewElement {
    /// Attach a new, paused element to `stream`
    pub fn attach(stream: Arc<dyn PreviewStream>) -> Self {
        debug!("Attaching preview element to {}", stream.source());
        Self {
            stream,
            playing: false,
        }
    }

    pub fn play(&mut self) {
        if !self.playing {
            debug!("Preview {} playing", self.stream.source());
        }
        self.playing = true;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn source(&self) -> &str {
        self.stream.source()
    }

    /// Grab the frame currently displayed
    pub async fn snapshot(&self) -> Result<FrameData, CameraError> {
        self.stream.current_frame().await
    }
}
