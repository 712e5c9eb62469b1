use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SelfcamConfig {
    pub camera: CameraConfig,
    pub display: DisplayConfig,
    pub capture: CaptureConfig,
    pub cues: CueConfig,
    pub gallery: GalleryConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Camera device index (e.g., 0 for /dev/video0)
    #[serde(default = "default_camera_index")]
    pub index: u32,

    /// Camera resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Frames per second
    #[serde(default = "default_camera_fps")]
    pub fps: u32,

    /// Request an audio track alongside the video
    #[serde(default = "default_camera_audio")]
    pub audio: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    /// Screen resolution the captured photo is drawn at (width, height)
    #[serde(default = "default_display_resolution")]
    pub resolution: (u32, u32),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CaptureConfig {
    /// Directory photos are written to
    #[serde(default = "default_save_directory")]
    pub save_directory: String,

    /// Filename prefix, followed by the 3-digit sequence and `.png`
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Countdown used until a timer button is pressed
    #[serde(default = "default_timer_seconds")]
    pub default_timer_seconds: u32,

    /// Countdown values offered by the timer buttons
    #[serde(default = "default_timer_presets")]
    pub timer_presets: Vec<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CueConfig {
    /// Play count and shutter cues
    #[serde(default = "default_cues_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GalleryConfig {
    /// Viewer command, invoked with the photo path as its last argument
    #[serde(default = "default_gallery_command")]
    pub command: String,

    /// MIME hint handed to the viewer
    #[serde(default = "default_gallery_mime_type")]
    pub mime_type: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl SelfcamConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("selfcam.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.index", default_camera_index())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("camera.fps", default_camera_fps())?
            .set_default("camera.audio", default_camera_audio())?
            .set_default(
                "display.resolution",
                vec![
                    default_display_resolution().0,
                    default_display_resolution().1,
                ],
            )?
            .set_default("capture.save_directory", default_save_directory())?
            .set_default("capture.file_prefix", default_file_prefix())?
            .set_default("capture.default_timer_seconds", default_timer_seconds())?
            .set_default("capture.timer_presets", default_timer_presets())?
            .set_default("cues.enabled", default_cues_enabled())?
            .set_default("gallery.command", default_gallery_command())?
            .set_default("gallery.mime_type", default_gallery_mime_type())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with SELFCAM_ prefix
            .add_source(Environment::with_prefix("SELFCAM").separator("__"))
            .build()?;

        let config: SelfcamConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.camera.fps == 0 {
            return Err(ConfigError::Message(
                "Camera fps must be greater than 0".to_string(),
            ));
        }

        if self.display.resolution.0 == 0 || self.display.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Display resolution must be greater than 0".to_string(),
            ));
        }

        if self.capture.save_directory.is_empty() {
            return Err(ConfigError::Message(
                "Capture save_directory must not be empty".to_string(),
            ));
        }

        if self.capture.file_prefix.is_empty() || self.capture.file_prefix.contains('/') {
            return Err(ConfigError::Message(
                "Capture file_prefix must be a non-empty file name fragment".to_string(),
            ));
        }

        if self.capture.file_prefix.chars().any(|c| c.is_ascii_digit()) {
            // the sequence is recovered by stripping every non-digit from the name
            return Err(ConfigError::Message(
                "Capture file_prefix must not contain digits".to_string(),
            ));
        }

        if self.capture.default_timer_seconds == 0 {
            return Err(ConfigError::Message(
                "Capture default_timer_seconds must be greater than 0".to_string(),
            ));
        }

        if self.capture.timer_presets.iter().any(|&t| t == 0) {
            return Err(ConfigError::Message(
                "Capture timer_presets must all be greater than 0".to_string(),
            ));
        }

        if self.gallery.command.trim().is_empty() {
            return Err(ConfigError::Message(
                "Gallery command must not be empty".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SelfcamConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                index: default_camera_index(),
                resolution: default_camera_resolution(),
                fps: default_camera_fps(),
                audio: default_camera_audio(),
            },
            display: DisplayConfig {
                resolution: default_display_resolution(),
            },
            capture: CaptureConfig {
                save_directory: default_save_directory(),
                file_prefix: default_file_prefix(),
                default_timer_seconds: default_timer_seconds(),
                timer_presets: default_timer_presets(),
            },
            cues: CueConfig {
                enabled: default_cues_enabled(),
            },
            gallery: GalleryConfig {
                command: default_gallery_command(),
                mime_type: default_gallery_mime_type(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

// Default value functions
fn default_camera_index() -> u32 {
    0
}
fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}
fn default_camera_fps() -> u32 {
    30
}
fn default_camera_audio() -> bool {
    true
}

fn default_display_resolution() -> (u32, u32) {
    (1280, 720)
}

fn default_save_directory() -> String {
    "./images".to_string()
}
fn default_file_prefix() -> String {
    "selfcam_widget_".to_string()
}
fn default_timer_seconds() -> u32 {
    2
}
fn default_timer_presets() -> Vec<u32> {
    vec![2, 5, 10]
}

fn default_cues_enabled() -> bool {
    true
}

fn default_gallery_command() -> String {
    "xdg-open".to_string()
}
fn default_gallery_mime_type() -> String {
    "image/*".to_string()
}

fn default_event_bus_capacity() -> usize {
    100
}
