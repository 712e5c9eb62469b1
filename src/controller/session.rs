use crate::countdown::Countdown;
use std::fmt;

/// Wrapping counter used to name photos, rendered with 3 digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequence(u16);

impl Sequence {
    pub const MODULUS: u16 = 1000;

    pub fn new(value: u16) -> Self {
        Self(value % Self::MODULUS)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// The following number. Wrapping past 999 continues at 1.
    pub fn next(self) -> Self {
        match (self.0 + 1) % Self::MODULUS {
            0 => Self(1),
            n => Self(n),
        }
    }

    /// Recover the sequence from a photo name by dropping every non-digit.
    /// Names without digits yield 0.
    pub fn from_file_name(name: &str) -> Self {
        let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
        digits
            .parse::<u64>()
            .map(|n| Self((n % Self::MODULUS as u64) as u16))
            .unwrap_or(Self(0))
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Where the controller is in the shutter cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    CountingDown,
    Capturing,
}

/// Mutable state of the capture controller
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub sequence: Sequence,
    /// Name of the most recent photo, empty when there is none
    pub filename: String,
    /// Directory new photos are written to, always ending in `/`
    pub save_directory: String,
    /// Directory the current photo was loaded from, always ending in `/`
    pub load_directory: String,
    /// Countdown length picked with the timer buttons
    pub timer_value: u32,
    pub countdown: Countdown,
    pub phase: CapturePhase,
}

impl CaptureSession {
    pub fn new(save_directory: &str, timer_value: u32) -> Self {
        Self {
            sequence: Sequence::default(),
            filename: String::new(),
            save_directory: with_trailing_slash(save_directory),
            load_directory: String::new(),
            timer_value,
            countdown: Countdown::default(),
            phase: CapturePhase::Idle,
        }
    }

    pub fn has_photo(&self) -> bool {
        !self.filename.is_empty()
    }

    /// Path the current photo is written to
    pub fn save_path(&self) -> String {
        format!("{}{}", self.save_directory, self.filename)
    }

    /// Path the current photo is shown from
    pub fn load_path(&self) -> String {
        format!("{}{}", self.load_directory, self.filename)
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown.remaining()
    }
}

pub(crate) fn with_trailing_slash(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{}/", dir)
    }
}
