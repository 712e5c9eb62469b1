use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelfcamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Gallery error: {0}")]
    Gallery(#[from] GalleryError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl SelfcamError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Failures of the storage helper
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Invalid file name: {name:?}")]
    InvalidName { name: String },

    #[error("Directory opened read-only: {path}")]
    ReadOnly { path: PathBuf },

    #[error("Refusing to save empty content to {path}")]
    EmptyContent { path: PathBuf },

    #[error("Entry {path} is outside directory {dir}")]
    OutsideDirectory { path: PathBuf, dir: PathBuf },

    #[error("Invalid content encoding: {details}")]
    InvalidEncoding { details: String },

    #[error("I/O failure on {path}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classify an I/O error raised while touching `path`
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied { path },
            io::ErrorKind::AlreadyExists => StorageError::AlreadyExists { path },
            _ => StorageError::IoFailure { path, source: err },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Capture device unavailable: {details}")]
    Unavailable { details: String },

    #[error("Camera configuration error: {details}")]
    Configuration { details: String },

    #[error("Capture stream error: {details}")]
    CaptureStream { details: String },
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No preview attached")]
    PreviewDetached,

    #[error("No image source")]
    EmptyPayload,

    #[error("Image encoding failed: {details}")]
    Encoding { details: String },

    #[error("Unsupported frame: {details}")]
    UnsupportedFrame { details: String },
}

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Failed to launch viewer for {uri}: {details}")]
    Launch { uri: String, details: String },
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Event channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, SelfcamError>;
