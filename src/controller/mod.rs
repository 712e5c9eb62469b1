//! Countdown/capture controller. A single actor owns the session state
//! and reacts to user commands and countdown ticks.

mod actor;
mod builder;
mod command;
mod photo;
mod preview;
mod session;
mod timer;
#[cfg(test)]
mod tests;

pub use actor::CaptureController;
pub use builder::CaptureControllerBuilder;
pub use command::{CommandSender, ControllerCommand, Visibility};
pub use session::{CapturePhase, CaptureSession, Sequence};
