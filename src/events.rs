use crate::error::EventBusError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Events published by the capture controller for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelfcamEvent {
    /// A preview element was attached to the live stream
    PreviewStarted { source: String },
    /// The preview element was detached (application hidden)
    PreviewDetached,
    /// A timer button selected a new countdown value
    TimerSelected { seconds: u32 },
    /// A countdown began (or resumed) at the given value
    CountdownStarted { remaining: u32 },
    /// The countdown display changed
    CountdownTick { remaining: u32 },
    /// The countdown expired and the shutter fired
    CountdownFinished,
    /// A frame was grabbed for the named file
    PhotoCaptured { filename: String },
    /// A photo was written to disk
    PhotoSaved { path: PathBuf },
    /// Thumbnail now shows the given photo, or is hidden
    ThumbnailChanged { path: Option<PathBuf> },
    /// Blocking user-visible message
    Alert { message: String },
    /// The external viewer was asked to open a photo
    GalleryLaunched { uri: String },
    /// A system error occurred in a component
    SystemError { component: String, error: String },
    /// System shutdown requested
    ShutdownRequested { reason: String },
}

impl SelfcamEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            SelfcamEvent::PreviewStarted { source } => format!("Preview started from {}", source),
            SelfcamEvent::PreviewDetached => "Preview detached".to_string(),
            SelfcamEvent::TimerSelected { seconds } => format!("Timer set to {}s", seconds),
            SelfcamEvent::CountdownStarted { remaining } => {
                format!("Countdown started at {}", remaining)
            }
            SelfcamEvent::CountdownTick { remaining } => format!("Countdown {}", remaining),
            SelfcamEvent::CountdownFinished => "Shutter".to_string(),
            SelfcamEvent::PhotoCaptured { filename } => format!("Captured {}", filename),
            SelfcamEvent::PhotoSaved { path } => format!("Saved {}", path.display()),
            SelfcamEvent::ThumbnailChanged { path: Some(path) } => {
                format!("Thumbnail {}", path.display())
            }
            SelfcamEvent::ThumbnailChanged { path: None } => "Thumbnail hidden".to_string(),
            SelfcamEvent::Alert { message } => format!("Alert: {}", message),
            SelfcamEvent::GalleryLaunched { uri } => format!("Viewing {}", uri),
            SelfcamEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
            SelfcamEvent::ShutdownRequested { reason } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            SelfcamEvent::PreviewStarted { .. } => "preview_started",
            SelfcamEvent::PreviewDetached => "preview_detached",
            SelfcamEvent::TimerSelected { .. } => "timer_selected",
            SelfcamEvent::CountdownStarted { .. } => "countdown_started",
            SelfcamEvent::CountdownTick { .. } => "countdown_tick",
            SelfcamEvent::CountdownFinished => "countdown_finished",
            SelfcamEvent::PhotoCaptured { .. } => "photo_captured",
            SelfcamEvent::PhotoSaved { .. } => "photo_saved",
            SelfcamEvent::ThumbnailChanged { .. } => "thumbnail_changed",
            SelfcamEvent::Alert { .. } => "alert",
            SelfcamEvent::GalleryLaunched { .. } => "gallery_launched",
            SelfcamEvent::SystemError { .. } => "system_error",
            SelfcamEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Async event bus for component coordination using broadcast channels
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SelfcamEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<SelfcamEvent> {
        self.sender.subscribe()
    }

    /// Subscribe with a filter, returning a named receiver
    pub fn subscribe_filtered(&self, filter: EventFilter, name: &str) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe(), filter, name.to_string())
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: SelfcamEvent) -> Result<usize, EventBusError> {
        match &event {
            SelfcamEvent::PhotoSaved { path } => {
                info!("Photo saved: {}", path.display());
            }
            SelfcamEvent::Alert { message } => {
                warn!("User alert: {}", message);
            }
            SelfcamEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            SelfcamEvent::ShutdownRequested { reason } => {
                info!("Shutdown requested: {}", reason);
            }
            _ => {}
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &SelfcamEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<SelfcamEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    /// Create a new event receiver with a filter
    pub fn new(
        receiver: broadcast::Receiver<SelfcamEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event. Lagged events are skipped with a warning.
    pub async fn recv(&mut self) -> Result<SelfcamEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<SelfcamEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => {
                    return Ok(None);
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}
