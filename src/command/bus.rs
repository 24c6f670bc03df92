use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::types::Command;
use crate::audio::Sound;
use crate::pad::{CellId, PadMode, PadOutput};

const BUS_CAPACITY: usize = 256;

/// Command channel between the session and the audio thread
pub struct CommandBus {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl CommandBus {
    pub fn new() -> Self {
        let (tx, rx) = bounded(BUS_CAPACITY);
        Self { tx, rx }
    }

    /// Get a sender that can be cloned and shared
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Get a receiver (typically for the audio thread)
    pub fn receiver(&self) -> CommandReceiver {
        CommandReceiver {
            rx: self.rx.clone(),
        }
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable sender for dispatching commands
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Send a command (non-blocking, drops if buffer full)
    pub fn send(&self, cmd: Command) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(cmd)) => {
                log::warn!("command buffer full, dropping: {}", cmd.description());
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl PadOutput for CommandSender {
    fn trigger(&self, cell: CellId, sound: &Sound, mode: PadMode) {
        self.send(Command::Trigger {
            cell,
            sound: sound.clone(),
            mode,
        });
    }

    fn stop(&self, cell: CellId) {
        self.send(Command::Stop(cell));
    }

    fn preview(&self, sound: &Sound) {
        self.send(Command::Preview(sound.clone()));
    }

    fn stop_all(&self) {
        self.send(Command::StopAll);
    }
}

/// Receiver for consuming commands
#[derive(Clone)]
pub struct CommandReceiver {
    rx: Receiver<Command>,
}

impl CommandReceiver {
    /// Try to receive a command (non-blocking)
    pub fn try_recv(&self) -> Option<Command> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_output_maps_to_commands() {
        let bus = CommandBus::new();
        let tx = bus.sender();
        let rx = bus.receiver();
        let snd = Sound::from_samples("kick", vec![0.1; 16], 44_100).unwrap();

        tx.trigger(3, &snd, PadMode::OneShot);
        tx.stop(3);
        tx.preview(&snd);
        tx.stop_all();

        assert_eq!(
            rx.try_recv(),
            Some(Command::Trigger { cell: 3, sound: snd.clone(), mode: PadMode::OneShot })
        );
        assert_eq!(rx.try_recv(), Some(Command::Stop(3)));
        assert_eq!(rx.try_recv(), Some(Command::Preview(snd)));
        assert_eq!(rx.try_recv(), Some(Command::StopAll));
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn test_full_bus_drops_commands() {
        let bus = CommandBus::new();
        let tx = bus.sender();

        for _ in 0..BUS_CAPACITY {
            assert!(tx.send(Command::StopAll));
        }
        assert!(!tx.send(Command::Stop(0)));
    }

    #[test]
    fn test_description() {
        let snd = Sound::from_samples("snare", vec![0.1; 16], 44_100).unwrap();
        let cmd = Command::Trigger { cell: 7, sound: snd, mode: PadMode::Loop };
        assert_eq!(cmd.description(), "Trigger cell 7 (snare, LOOP)");
    }
}
