pub mod app;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod controller;
pub mod countdown;
pub mod cues;
pub mod error;
pub mod events;
pub mod frame;
pub mod gallery;
pub mod storage;
pub mod ui;

pub use app::{AppOptions, ComponentState, SelfcamApp, ShutdownReason};
pub use camera::{CaptureDevice, CaptureOptions, PreviewElement, PreviewStream, TestPatternCamera};
pub use canvas::Canvas;
pub use config::SelfcamConfig;
pub use controller::{
    CaptureController, CaptureControllerBuilder, CapturePhase, CaptureSession, ControllerCommand,
    Sequence, Visibility,
};
pub use cues::{Cue, CuePlayer};
pub use error::{Result, SelfcamError};
pub use events::{EventBus, EventFilter, EventReceiver, SelfcamEvent};
pub use frame::{pack_rows, FrameData, FrameFormat};
pub use gallery::{CommandLauncher, GalleryLauncher};
pub use storage::{ContentEncoding, FileHandle, StorageHelper};
