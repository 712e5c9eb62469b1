use super::actor::CaptureController;
use super::command::Visibility;
use crate::camera::{PreviewElement, PreviewStream};
use crate::error::Result;
use crate::events::SelfcamEvent;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

impl CaptureController {
    /// Request the live stream, attach a preview to it and select the
    /// default timer
    pub async fn start_preview(&mut self) -> Result<()> {
        let stream = self
            .camera
            .request_capture(&self.capture_options)
            .await
            .map_err(|e| {
                error!("Capture device error: {}", e);
                e
            })?;

        info!("Live stream {} opened", stream.source());
        self.stream = Some(Arc::clone(&stream));
        self.attach_preview(stream);
        self.set_timer(self.config.default_timer_seconds);
        Ok(())
    }

    fn attach_preview(&mut self, stream: Arc<dyn PreviewStream>) {
        let source = stream.source().to_string();
        let mut element = PreviewElement::attach(stream);
        element.play();
        self.preview = Some(element);
        self.publish(SelfcamEvent::PreviewStarted { source });
    }

    /// React to the application being shown or hidden.
    ///
    /// Either way the countdown ticker stops. Hiding drops the preview
    /// element. Showing attaches a new one to the same stream, reloads the
    /// latest photo if the current one is gone, and resumes a pending
    /// countdown from where it stopped.
    pub async fn on_visibility_changed(&mut self, visibility: Visibility) {
        let Some(stream) = self.stream.clone() else {
            debug!("No live stream yet, ignoring {:?}", visibility);
            return;
        };

        self.stop_ticker();

        match visibility {
            Visibility::Hidden => {
                if self.preview.take().is_some() {
                    debug!("Preview detached from {}", stream.source());
                    self.publish(SelfcamEvent::PreviewDetached);
                }
            }
            Visibility::Visible => {
                self.attach_preview(stream);

                let exists = self.session.has_photo()
                    && self.storage.file_exists(&self.session.load_path()).await;
                if !exists {
                    if let Err(e) = self.set_last_photo().await {
                        warn!("Could not reload last photo: {}", e);
                    }
                }

                if self.session.countdown.is_pending() {
                    let remaining = self.session.countdown.remaining();
                    debug!("Resuming countdown at {}", remaining);
                    self.start_countdown(Some(remaining));
                }
            }
        }
    }
}
