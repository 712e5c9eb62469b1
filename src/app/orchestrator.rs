use super::types::{AppOptions, ComponentState, ShutdownReason};
use crate::camera::{CaptureDevice, TestPatternCamera};
use crate::config::SelfcamConfig;
use crate::controller::{CaptureController, CaptureControllerBuilder, CommandSender};
use crate::cues::{CuePlayer, SilentCuePlayer, TerminalCuePlayer};
use crate::error::Result;
use crate::events::EventBus;
use crate::gallery::{CommandLauncher, GalleryLauncher};
use crate::ui::{KeyboardInputHandler, StatusRenderer};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Wires the controller to its collaborators
pub struct SelfcamApp {
    pub(super) config: SelfcamConfig,
    pub(super) options: AppOptions,
    pub(super) event_bus: Arc<EventBus>,

    // Components
    pub(super) controller: Option<CaptureController>,
    pub(super) commands: CommandSender,
    pub(super) controller_task: Option<JoinHandle<Result<()>>>,
    pub(super) keyboard_handler: Option<KeyboardInputHandler>,
    pub(super) status_renderer: Option<StatusRenderer>,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<String, ComponentState>>>,
    pub(super) shutdown_sender: Option<oneshot::Sender<ShutdownReason>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
}

impl SelfcamApp {
    /// Create the application. The save directory is created if missing.
    pub async fn new(mut config: SelfcamConfig, options: AppOptions) -> Result<Self> {
        let save_directory = &config.capture.save_directory;
        tokio::fs::create_dir_all(save_directory).await?;
        let save_directory = tokio::fs::canonicalize(save_directory).await?;
        info!("Photos are saved in {}", save_directory.display());
        config.capture.save_directory = save_directory.to_string_lossy().into_owned();

        let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();

        let camera = build_camera(&config, options.force_test_pattern)?;

        let cues: Arc<dyn CuePlayer> = if config.cues.enabled {
            Arc::new(TerminalCuePlayer)
        } else {
            Arc::new(SilentCuePlayer)
        };

        let gallery: Arc<dyn GalleryLauncher> =
            Arc::new(CommandLauncher::from_config(&config.gallery));

        let controller = CaptureControllerBuilder::new()
            .config(config.clone())
            .camera(camera)
            .cues(cues)
            .gallery(gallery)
            .event_bus(Arc::clone(&event_bus))
            .build()?;
        let commands = controller.command_sender();

        let keyboard_handler = options.keyboard_enabled.then(|| {
            KeyboardInputHandler::new(
                commands.clone(),
                Arc::clone(&event_bus),
                config.capture.timer_presets.clone(),
            )
        });

        let status_renderer = options
            .status
            .map(|format| StatusRenderer::new(Arc::clone(&event_bus), format));

        Ok(Self {
            config,
            options,
            event_bus,
            controller: Some(controller),
            commands,
            controller_task: None,
            keyboard_handler,
            status_renderer,
            component_states: Arc::new(Mutex::new(HashMap::new())),
            shutdown_sender: Some(shutdown_sender),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &SelfcamConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Sender reaching the running controller
    pub fn command_sender(&self) -> CommandSender {
        self.commands.clone()
    }
}

#[cfg(all(feature = "camera", target_os = "linux"))]
fn build_camera(
    config: &SelfcamConfig,
    force_test_pattern: bool,
) -> Result<Arc<dyn CaptureDevice>> {
    if force_test_pattern {
        info!("Using test pattern camera");
        return Ok(Arc::new(TestPatternCamera::from_config(&config.camera)));
    }

    let camera = crate::camera::GstCamera::new(config.camera.clone())?;
    info!("Using camera device {}", config.camera.index);
    Ok(Arc::new(camera))
}

#[cfg(not(all(feature = "camera", target_os = "linux")))]
fn build_camera(
    config: &SelfcamConfig,
    force_test_pattern: bool,
) -> Result<Arc<dyn CaptureDevice>> {
    if !force_test_pattern {
        info!("Built without the camera feature, using test pattern camera");
    }
    Ok(Arc::new(TestPatternCamera::from_config(&config.camera)))
}
