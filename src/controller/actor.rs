use super::command::{CommandSender, ControllerCommand};
use super::session::{CapturePhase, CaptureSession};
use crate::camera::{CaptureDevice, CaptureOptions, PreviewElement, PreviewStream};
use crate::config::CaptureConfig;
use crate::countdown::CountdownTicker;
use crate::cues::CuePlayer;
use crate::error::Result;
use crate::events::{EventBus, SelfcamEvent};
use crate::gallery::GalleryLauncher;
use crate::storage::StorageHelper;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

/// Actor driving the preview and the photo countdown.
///
/// Every state change happens inside [`CaptureController::run`] (or a direct
/// call from a test), one command at a time, so ticks and user input never
/// interleave.
pub struct CaptureController {
    pub(super) config: CaptureConfig,
    pub(super) gallery_mime_type: String,
    pub(super) display_resolution: (u32, u32),
    pub(super) capture_options: CaptureOptions,
    pub(super) session: CaptureSession,
    pub(super) storage: StorageHelper,

    // Collaborators
    pub(super) camera: Arc<dyn CaptureDevice>,
    pub(super) cues: Arc<dyn CuePlayer>,
    pub(super) gallery: Arc<dyn GalleryLauncher>,
    pub(super) event_bus: Arc<EventBus>,

    // Preview
    pub(super) stream: Option<Arc<dyn PreviewStream>>,
    pub(super) preview: Option<PreviewElement>,
    pub(super) thumbnail: Option<PathBuf>,

    // Countdown
    pub(super) ticker: Option<CountdownTicker>,
    pub(super) ticker_generation: u64,
    pub(super) tick_period: Duration,

    pub(super) command_tx: CommandSender,
    command_rx: mpsc::UnboundedReceiver<ControllerCommand>,
}

impl CaptureController {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        config: CaptureConfig,
        gallery_mime_type: String,
        display_resolution: (u32, u32),
        capture_options: CaptureOptions,
        camera: Arc<dyn CaptureDevice>,
        cues: Arc<dyn CuePlayer>,
        gallery: Arc<dyn GalleryLauncher>,
        event_bus: Arc<EventBus>,
        tick_period: Duration,
    ) -> Self {
        let session = CaptureSession::new(&config.save_directory, config.default_timer_seconds);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        Self {
            config,
            gallery_mime_type,
            display_resolution,
            capture_options,
            session,
            storage: StorageHelper::new(),
            camera,
            cues,
            gallery,
            event_bus,
            stream: None,
            preview: None,
            thumbnail: None,
            ticker: None,
            ticker_generation: 0,
            tick_period,
            command_tx,
            command_rx,
        }
    }

    /// Sender for commands handled by [`CaptureController::run`]
    pub fn command_sender(&self) -> CommandSender {
        self.command_tx.clone()
    }

    /// Process commands until shutdown is requested or `cancel` fires
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        info!("Capture controller started");

        loop {
            let command = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Capture controller cancelled");
                    break;
                }
                command = self.command_rx.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            if command == ControllerCommand::Shutdown {
                debug!("Capture controller received shutdown");
                break;
            }

            if let Err(e) = self.handle_command(command).await {
                error!("Capture controller error: {}", e);
                self.publish(SelfcamEvent::SystemError {
                    component: "controller".to_string(),
                    error: e.to_string(),
                });
            }
        }

        self.stop_ticker();
        info!("Capture controller stopped");
        Ok(())
    }

    /// Apply a single command
    pub async fn handle_command(&mut self, command: ControllerCommand) -> Result<()> {
        trace!("Handling {:?}", command);

        match command {
            ControllerCommand::Shutter => {
                self.start_countdown(None);
            }
            ControllerCommand::SetTimer(seconds) => {
                if self.session.phase != CapturePhase::Idle {
                    debug!("Ignoring {}s timer during countdown", seconds);
                } else {
                    self.set_timer(seconds);
                }
            }
            ControllerCommand::LaunchPreview => {
                if self.session.phase != CapturePhase::Idle {
                    debug!("Ignoring thumbnail launch during countdown");
                } else {
                    self.launch_preview().await;
                }
            }
            ControllerCommand::VisibilityChanged(visibility) => {
                self.on_visibility_changed(visibility).await;
            }
            ControllerCommand::CountdownTick { generation } => {
                if self.is_current_ticker(generation) {
                    self.on_countdown_tick().await?;
                } else {
                    trace!("Ignoring tick from stale countdown {}", generation);
                }
            }
            ControllerCommand::Shutdown => {
                debug!("Shutdown is handled by the run loop");
            }
        }

        Ok(())
    }

    /// Wait for the next queued command without handling it
    pub async fn next_command(&mut self) -> Option<ControllerCommand> {
        self.command_rx.recv().await
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Directory new photos are written to
    pub fn save_directory(&self) -> &Path {
        Path::new(&self.session.save_directory)
    }

    pub fn is_preview_attached(&self) -> bool {
        self.preview.is_some()
    }

    pub fn preview(&self) -> Option<&PreviewElement> {
        self.preview.as_ref()
    }

    /// Photo currently shown as thumbnail, `None` when hidden
    pub fn thumbnail(&self) -> Option<&Path> {
        self.thumbnail.as_deref()
    }

    pub fn has_active_timer(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| t.is_active())
    }

    /// Generation of the ticker currently driving the countdown
    pub fn ticker_generation(&self) -> Option<u64> {
        self.ticker.as_ref().map(|t| t.generation())
    }

    fn is_current_ticker(&self, generation: u64) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|t| t.generation() == generation)
    }

    /// Publish an event. Nobody listening is not an error for the controller.
    pub(super) fn publish(&self, event: SelfcamEvent) {
        if let Err(e) = self.event_bus.publish(event) {
            trace!("Event not delivered: {}", e);
        }
    }
}
