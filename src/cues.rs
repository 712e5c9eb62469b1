use std::io::Write;
use tracing::{debug, trace};

/// Audible cues played by the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Played each time the countdown value is shown
    Count,
    /// Played when the shutter fires
    Shutter,
}

/// Plays countdown cues. Implementations must not block.
pub trait CuePlayer: Send + Sync {
    fn play(&self, cue: Cue);
}

/// Rings the terminal bell: once per count, twice for the shutter
#[derive(Debug, Default)]
pub struct TerminalCuePlayer;

impl CuePlayer for TerminalCuePlayer {
    fn play(&self, cue: Cue) {
        let bells = match cue {
            Cue::Count => "\x07",
            Cue::Shutter => "\x07\x07",
        };

        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(bells.as_bytes()).and_then(|_| stdout.flush()) {
            debug!("Failed to play {:?} cue: {}", cue, e);
        }
    }
}

/// Cue player used when cues are disabled
#[derive(Debug, Default)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn play(&self, cue: Cue) {
        trace!("Skipping {:?} cue", cue);
    }
}
