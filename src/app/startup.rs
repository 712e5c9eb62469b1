use super::{ComponentState, SelfcamApp};
use crate::error::{Result, SelfcamError};
use crate::events::SelfcamEvent;
use tracing::{error, info, warn};

impl SelfcamApp {
    /// Register the components that will be started
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing selfcam components");

        let mut states = self.component_states.lock().await;
        states.insert("controller".to_string(), ComponentState::Stopped);
        if self.keyboard_handler.is_some() {
            states.insert("keyboard".to_string(), ComponentState::Stopped);
        }
        if self.status_renderer.is_some() {
            states.insert("status".to_string(), ComponentState::Stopped);
        }
        drop(states);

        info!("All components initialized successfully");
        Ok(())
    }

    /// Open the preview on top of the last saved photo, then start the controller loop
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting selfcam ({:?})", self.options);

        // Status first so startup events are shown
        if let Some(status_renderer) = &self.status_renderer {
            self.set_component_state("status", ComponentState::Starting).await;
            status_renderer.start().await?;
            self.set_component_state("status", ComponentState::Running).await;
        }

        let mut controller = self
            .controller
            .take()
            .ok_or_else(|| SelfcamError::system("Controller already started"))?;
        self.set_component_state("controller", ComponentState::Starting).await;

        if let Err(e) = controller.set_last_photo().await {
            warn!("Starting without a previous photo: {}", e);
        }

        // The app keeps running without a preview; the shutter reports the failure
        if let Err(e) = controller.start_preview().await {
            error!("Failed to start preview: {}", e);
            let _ = self.event_bus.publish(SelfcamEvent::SystemError {
                component: "camera".to_string(),
                error: e.to_string(),
            });
        }

        let token = self.cancellation_token.child_token();
        self.controller_task = Some(tokio::spawn(controller.run(token)));
        self.set_component_state("controller", ComponentState::Running).await;

        if let Some(keyboard_handler) = &self.keyboard_handler {
            self.set_component_state("keyboard", ComponentState::Starting).await;
            keyboard_handler.start().await.map_err(|e| {
                error!("Failed to start keyboard handler: {}", e);
                e
            })?;
            self.set_component_state("keyboard", ComponentState::Running).await;
        }

        info!("Selfcam started successfully");
        Ok(())
    }
}
