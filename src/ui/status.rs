use crate::error::Result;
use crate::events::{EventBus, EventFilter, SelfcamEvent};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How status lines are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFormat {
    #[default]
    Text,
    Json,
}

/// Render one event as a status line
pub fn render(event: &SelfcamEvent, format: StatusFormat) -> String {
    match format {
        StatusFormat::Text => match event {
            SelfcamEvent::CountdownStarted { remaining }
            | SelfcamEvent::CountdownTick { remaining } => format!("[ {} ]", remaining),
            SelfcamEvent::Alert { message } => format!("!! {}", message),
            other => other.description(),
        },
        StatusFormat::Json => serde_json::to_string(event).unwrap_or_else(|e| {
            warn!("Failed to serialize {}: {}", event.event_type(), e);
            event.description()
        }),
    }
}

/// Prints controller events to the terminal
pub struct StatusRenderer {
    event_bus: Arc<EventBus>,
    format: StatusFormat,
    cancellation_token: CancellationToken,
}

impl StatusRenderer {
    pub fn new(event_bus: Arc<EventBus>, format: StatusFormat) -> Self {
        Self {
            event_bus,
            format,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Subscribe to the event bus and print every event until stopped
    pub async fn start(&self) -> Result<()> {
        let mut receiver = self.event_bus.subscribe_filtered(EventFilter::All, "status");
        let format = self.format;
        let token = self.cancellation_token.clone();

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = token.cancelled() => break,
                    event = receiver.recv() => match event {
                        Ok(event) => event,
                        Err(_) => break,
                    },
                };

                // Raw mode needs an explicit carriage return
                let mut stdout = std::io::stdout();
                if let Err(e) =
                    write!(stdout, "{}\r\n", render(&event, format)).and_then(|_| stdout.flush())
                {
                    debug!("Status line not written: {}", e);
                }
            }
            debug!("Status renderer exited");
        });

        info!("Status renderer started ({:?})", self.format);
        Ok(())
    }

    pub fn stop(&self) {
        self.cancellation_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_text_status_lines() {
        assert_eq!(
            render(&SelfcamEvent::CountdownTick { remaining: 3 }, StatusFormat::Text),
            "[ 3 ]"
        );
        assert_eq!(
            render(
                &SelfcamEvent::Alert {
                    message: "Data source error: No image source".to_string()
                },
                StatusFormat::Text
            ),
            "!! Data source error: No image source"
        );
        assert_eq!(
            render(
                &SelfcamEvent::PhotoSaved {
                    path: PathBuf::from("images/selfcam_widget_002.png")
                },
                StatusFormat::Text
            ),
            "Saved images/selfcam_widget_002.png"
        );
    }

    #[test]
    fn test_json_status_lines() {
        let line = render(
            &SelfcamEvent::ThumbnailChanged { path: None },
            StatusFormat::Json,
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "thumbnail_changed");
        assert!(value["path"].is_null());
    }

    #[tokio::test]
    async fn test_renderer_subscribes_until_stopped() {
        let bus = Arc::new(EventBus::new(10));
        let renderer = StatusRenderer::new(Arc::clone(&bus), StatusFormat::Text);

        renderer.start().await.unwrap();
        assert_eq!(bus.subscriber_count(), 1);

        renderer.stop();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(bus.subscriber_count(), 0);
    }
}
