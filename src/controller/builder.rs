use super::actor::CaptureController;
use crate::camera::{CaptureDevice, CaptureOptions};
use crate::config::SelfcamConfig;
use crate::countdown::TICK_PERIOD;
use crate::cues::{CuePlayer, SilentCuePlayer};
use crate::error::{Result, SelfcamError};
use crate::events::EventBus;
use crate::gallery::GalleryLauncher;
use std::sync::Arc;
use std::time::Duration;

/// Builder wiring the controller to its collaborators
pub struct CaptureControllerBuilder {
    config: Option<SelfcamConfig>,
    camera: Option<Arc<dyn CaptureDevice>>,
    cues: Option<Arc<dyn CuePlayer>>,
    gallery: Option<Arc<dyn GalleryLauncher>>,
    event_bus: Option<Arc<EventBus>>,
    display_resolution: Option<(u32, u32)>,
    tick_period: Duration,
}

impl CaptureControllerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            camera: None,
            cues: None,
            gallery: None,
            event_bus: None,
            display_resolution: None,
            tick_period: TICK_PERIOD,
        }
    }

    /// Set the application configuration
    pub fn config(mut self, config: SelfcamConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the capture device the preview is requested from
    pub fn camera(mut self, camera: Arc<dyn CaptureDevice>) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Set the cue player. Defaults to silence.
    pub fn cues(mut self, cues: Arc<dyn CuePlayer>) -> Self {
        self.cues = Some(cues);
        self
    }

    /// Set the external photo viewer
    pub fn gallery(mut self, gallery: Arc<dyn GalleryLauncher>) -> Self {
        self.gallery = Some(gallery);
        self
    }

    /// Set the event bus
    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Override the snapshot canvas size taken from the display configuration
    pub fn display_resolution(mut self, resolution: (u32, u32)) -> Self {
        self.display_resolution = Some(resolution);
        self
    }

    pub fn tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Build the controller
    pub fn build(self) -> Result<CaptureController> {
        let config = self
            .config
            .ok_or_else(|| SelfcamError::component("controller", "Configuration is required"))?;

        let camera = self
            .camera
            .ok_or_else(|| SelfcamError::component("controller", "Capture device is required"))?;

        let gallery = self
            .gallery
            .ok_or_else(|| SelfcamError::component("controller", "Gallery launcher is required"))?;

        let event_bus = self
            .event_bus
            .ok_or_else(|| SelfcamError::component("controller", "Event bus is required"))?;

        let cues = self
            .cues
            .unwrap_or_else(|| Arc::new(SilentCuePlayer) as Arc<dyn CuePlayer>);

        let display_resolution = self
            .display_resolution
            .unwrap_or(config.display.resolution);

        let capture_options = CaptureOptions {
            audio: config.camera.audio,
            video: true,
        };

        Ok(CaptureController::new(
            config.capture,
            config.gallery.mime_type,
            display_resolution,
            capture_options,
            camera,
            cues,
            gallery,
            event_bus,
            self.tick_period,
        ))
    }
}

impl Default for CaptureControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
