use crate::ui::StatusFormat;

/// Component lifecycle states
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed,
}

/// System shutdown reason
#[derive(Debug, Clone, PartialEq)]
pub enum ShutdownReason {
    Signal(String),
    UserRequest,
}

/// Runtime switches taken from the command line
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Use the synthetic camera even when a real one is available
    pub force_test_pattern: bool,
    /// Read commands from the terminal
    pub keyboard_enabled: bool,
    /// Print events as status lines
    pub status: Option<StatusFormat>,
}
