use super::{ComponentState, SelfcamApp};
use crate::controller::ControllerCommand;
use crate::error::{Result, SelfcamError};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info};

const CONTROLLER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

impl SelfcamApp {
    /// Stop the keyboard, then the controller, then the status output.
    /// Returns the process exit code.
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");
        let mut exit_code = 0;

        if let Some(keyboard_handler) = &self.keyboard_handler {
            self.set_component_state("keyboard", ComponentState::Stopping).await;
            match keyboard_handler.stop().await {
                Ok(()) => {
                    self.set_component_state("keyboard", ComponentState::Stopped).await;
                }
                Err(e) => {
                    error!("Error stopping keyboard: {}", e);
                    self.set_component_state("keyboard", ComponentState::Failed).await;
                    exit_code = 1;
                }
            }
        }

        if let Err(e) = self.stop_controller().await {
            error!("Error stopping controller: {}", e);
            exit_code = 1;
        }

        // Cancel everything still running
        self.cancellation_token.cancel();

        if let Some(status_renderer) = &self.status_renderer {
            status_renderer.stop();
            self.set_component_state("status", ComponentState::Stopped).await;
        }

        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }

    async fn stop_controller(&mut self) -> Result<()> {
        let Some(task) = self.controller_task.take() else {
            debug!("Controller was never started");
            return Ok(());
        };

        self.set_component_state("controller", ComponentState::Stopping).await;
        if self.commands.send(ControllerCommand::Shutdown).is_err() {
            debug!("Controller already gone");
        }

        match timeout(CONTROLLER_STOP_TIMEOUT, task).await {
            Ok(Ok(Ok(()))) => {
                self.set_component_state("controller", ComponentState::Stopped).await;
                info!("controller component stopped");
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                self.set_component_state("controller", ComponentState::Failed).await;
                Err(e)
            }
            Ok(Err(e)) => {
                self.set_component_state("controller", ComponentState::Failed).await;
                Err(SelfcamError::component(
                    "controller".to_string(),
                    format!("task failed: {}", e),
                ))
            }
            Err(_) => {
                self.set_component_state("controller", ComponentState::Failed).await;
                Err(SelfcamError::system("controller component stop timeout"))
            }
        }
    }
}
