use crate::config::GalleryConfig;
use crate::error::GalleryError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Hands a photo to an external viewer application
#[async_trait]
pub trait GalleryLauncher: Send + Sync {
    /// Ask the viewer to open `uri`. Only the launch itself is acknowledged.
    async fn launch(&self, uri: &str, mime_type: &str) -> Result<(), GalleryError>;
}

/// Launches the configured viewer command with the photo as its last argument
pub struct CommandLauncher {
    program: String,
    args: Vec<String>,
}

impl CommandLauncher {
    /// Build from a command line such as `"xdg-open"` or `"feh --fullscreen"`
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
        }
    }

    pub fn from_config(config: &GalleryConfig) -> Self {
        Self::new(&config.command)
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl GalleryLauncher for CommandLauncher {
    async fn launch(&self, uri: &str, mime_type: &str) -> Result<(), GalleryError> {
        let target = uri.strip_prefix("file://").unwrap_or(uri);
        debug!(
            "Launching {} {:?} {} ({})",
            self.program, self.args, target, mime_type
        );

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(target)
            .env("SELFCAM_MIME_TYPE", mime_type)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                error!("Photo launch failed: {}", e);
                GalleryError::Launch {
                    uri: uri.to_string(),
                    details: e.to_string(),
                }
            })?;

        info!("Viewer started for {} (pid {:?})", target, child.id());
        Ok(())
    }
}
