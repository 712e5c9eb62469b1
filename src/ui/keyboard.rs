use crate::controller::{CommandSender, ControllerCommand, Visibility};
use crate::error::Result;
use crate::events::{EventBus, SelfcamEvent};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What a key press asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Command(ControllerCommand),
    ToggleVisibility,
    Quit,
}

/// Map a key to its action. Digit keys pick the timer preset ending in that
/// digit, so `0` selects 10 seconds.
pub fn key_action(code: KeyCode, timer_presets: &[u32]) -> Option<KeyAction> {
    match code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(KeyAction::Command(ControllerCommand::Shutter)),
        KeyCode::Char('p') => Some(KeyAction::Command(ControllerCommand::LaunchPreview)),
        KeyCode::Char('h') => Some(KeyAction::ToggleVisibility),
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char(c) => {
            let digit = c.to_digit(10)?;
            timer_presets
                .iter()
                .find(|seconds| **seconds % 10 == digit)
                .map(|seconds| KeyAction::Command(ControllerCommand::SetTimer(*seconds)))
        }
        _ => None,
    }
}

/// Reads the terminal in raw mode and forwards key presses to the controller
pub struct KeyboardInputHandler {
    commands: CommandSender,
    event_bus: Arc<EventBus>,
    timer_presets: Vec<u32>,
    cancellation_token: CancellationToken,
}

impl KeyboardInputHandler {
    pub fn new(commands: CommandSender, event_bus: Arc<EventBus>, timer_presets: Vec<u32>) -> Self {
        Self {
            commands,
            event_bus,
            timer_presets,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start listening for keyboard input
    pub async fn start(&self) -> Result<()> {
        info!("Keyboard active: SPACE shutter, 2/5/0 timer, p preview, h hide, q quit");

        let commands = self.commands.clone();
        let event_bus = Arc::clone(&self.event_bus);
        let presets = self.timer_presets.clone();
        let cancellation_token = self.cancellation_token.clone();

        task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            let mut visibility = Visibility::Visible;

            loop {
                if cancellation_token.is_cancelled() {
                    debug!("Keyboard input handler stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(Event::Key(key_event)) = event::read() else {
                            continue;
                        };
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }

                        let command = match key_action(key_event.code, &presets) {
                            Some(KeyAction::Command(command)) => command,
                            Some(KeyAction::ToggleVisibility) => {
                                visibility = visibility.toggled();
                                ControllerCommand::VisibilityChanged(visibility)
                            }
                            Some(KeyAction::Quit) => {
                                info!("Quit key pressed - requesting shutdown");
                                if let Err(e) = event_bus.publish(SelfcamEvent::ShutdownRequested {
                                    reason: "User requested via keyboard".to_string(),
                                }) {
                                    warn!("Failed to publish shutdown event: {}", e);
                                }
                                break;
                            }
                            None => {
                                debug!("Key pressed: {:?}", key_event.code);
                                continue;
                            }
                        };

                        if commands.send(command).is_err() {
                            debug!("Controller gone, keyboard handler exiting");
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            } else {
                debug!("Raw mode disabled");
            }
        });

        Ok(())
    }

    /// Stop the keyboard input handler
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        // Give the task a moment to clean up and disable raw mode
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = disable_raw_mode();

        Ok(())
    }
}
