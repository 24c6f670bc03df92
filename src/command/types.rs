use crate::audio::Sound;
use crate::pad::{CellId, PadMode};

/// Playback requests sent from the UI thread to the output stream
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Trigger {
        cell: CellId,
        sound: Sound,
        mode: PadMode,
    },
    Stop(CellId),
    Preview(Sound),
    StopAll,
}

impl Command {
    /// Human-readable description of the command
    pub fn description(&self) -> String {
        match self {
            Command::Trigger { cell, sound, mode } => {
                format!("Trigger cell {} ({}, {})", cell, sound.name(), mode.label())
            }
            Command::Stop(cell) => format!("Stop cell {}", cell),
            Command::Preview(sound) => format!("Preview '{}'", sound.name()),
            Command::StopAll => "Stop all voices".to_string(),
        }
    }
}
