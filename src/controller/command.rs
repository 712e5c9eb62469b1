use tokio::sync::mpsc;

/// Whether the application is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn toggled(self) -> Self {
        match self {
            Visibility::Visible => Visibility::Hidden,
            Visibility::Hidden => Visibility::Visible,
        }
    }
}

/// Requests handled by the capture controller, one at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCommand {
    /// Shutter button: start a countdown with the selected timer
    Shutter,
    /// Timer button: select a countdown length
    SetTimer(u32),
    /// Thumbnail tap: open the latest photo in the viewer
    LaunchPreview,
    /// The application was shown or hidden
    VisibilityChanged(Visibility),
    /// Tick of the countdown ticker with the given generation
    CountdownTick { generation: u64 },
    /// Stop the controller loop
    Shutdown,
}

/// Handle used by input sources and tickers to reach the controller
pub type CommandSender = mpsc::UnboundedSender<ControllerCommand>;
