//! Terminal binding: keys in, status lines out

mod keyboard;
mod status;

pub use keyboard::{key_action, KeyAction, KeyboardInputHandler};
pub use status::{StatusFormat, StatusRenderer};
