pub mod assign;
pub mod hotkey;

use crate::audio::Sound;

pub use assign::{AssignmentController, ClickOutcome, LoadOutcome};
pub use hotkey::{Hotkey, HotkeyRegistry, KeyOutcome};

/// Index of a cell in the grid, row-major
pub type CellId = usize;

/// Largest number of rows or columns; each cell is a terminal pad
pub const MAX_GRID_SIDE: usize = 16;

/// Playback behaviour of a cell when it is triggered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadMode {
    /// Every trigger restarts the sound from the beginning
    Cut,
    /// First trigger starts a loop, the next one stops it
    Loop,
    /// Plays once to the end, retriggers while playing are ignored
    OneShot,
}

impl PadMode {
    pub fn next(self) -> Self {
        match self {
            PadMode::Cut => PadMode::Loop,
            PadMode::Loop => PadMode::OneShot,
            PadMode::OneShot => PadMode::Cut,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PadMode::Cut => "CUT",
            PadMode::Loop => "LOOP",
            PadMode::OneShot => "ONE",
        }
    }
}

/// Where triggered cells end up. Implemented by the audio command bus.
pub trait PadOutput {
    fn trigger(&self, cell: CellId, sound: &Sound, mode: PadMode);

    /// Silence whatever the cell is currently playing
    fn stop(&self, cell: CellId);

    /// Play a sound once outside the grid
    fn preview(&self, sound: &Sound);

    /// Silence every cell and the preview
    fn stop_all(&self);
}

/// One grid slot
#[derive(Debug)]
pub struct Cell {
    id: CellId,
    mode: PadMode,
    sound: Option<Sound>,
    // Mirror of the registry binding; only HotkeyRegistry writes it.
    hotkey: Option<Hotkey>,
}

impl Cell {
    fn new(id: CellId) -> Self {
        Self {
            id,
            mode: PadMode::Cut,
            sound: None,
            hotkey: None,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn mode(&self) -> PadMode {
        self.mode
    }

    pub fn sound(&self) -> Option<&Sound> {
        self.sound.as_ref()
    }

    pub fn hotkey(&self) -> Option<Hotkey> {
        self.hotkey
    }

    pub fn cycle_mode(&mut self) -> PadMode {
        self.mode = self.mode.next();
        self.mode
    }

    /// Store a sound, returning the one it replaced
    pub fn assign(&mut self, sound: Sound) -> Option<Sound> {
        self.sound.replace(sound)
    }

    /// Trigger playback. Returns false (and does nothing) for an empty cell.
    pub fn run(&self, out: &dyn PadOutput) -> bool {
        match &self.sound {
            Some(sound) => {
                out.trigger(self.id, sound, self.mode);
                true
            }
            None => false,
        }
    }

    fn set_hotkey(&mut self, key: Option<Hotkey>) {
        self.hotkey = key;
    }
}

/// Fixed `width x height` collection of cells, each side in `1..=MAX_GRID_SIDE`
pub struct CellGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.clamp(1, MAX_GRID_SIDE);
        let height = height.clamp(1, MAX_GRID_SIDE);
        Self {
            width,
            height,
            cells: (0..width * height).map(Cell::new).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id)
    }

    pub fn id_at(&self, row: usize, col: usize) -> Option<CellId> {
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum OutputCall {
        Trigger(CellId, Sound, PadMode),
        Stop(CellId),
        Preview(Sound),
        StopAll,
    }

    /// PadOutput that remembers every call; clones share the call list
    #[derive(Clone, Default)]
    pub struct RecordingOutput {
        pub calls: Rc<RefCell<Vec<OutputCall>>>,
    }

    impl RecordingOutput {
        pub fn take(&self) -> Vec<OutputCall> {
            std::mem::take(&mut *self.calls.borrow_mut())
        }
    }

    impl PadOutput for RecordingOutput {
        fn trigger(&self, cell: CellId, sound: &Sound, mode: PadMode) {
            self.calls
                .borrow_mut()
                .push(OutputCall::Trigger(cell, sound.clone(), mode));
        }

        fn stop(&self, cell: CellId) {
            self.calls.borrow_mut().push(OutputCall::Stop(cell));
        }

        fn preview(&self, sound: &Sound) {
            self.calls.borrow_mut().push(OutputCall::Preview(sound.clone()));
        }

        fn stop_all(&self) {
            self.calls.borrow_mut().push(OutputCall::StopAll);
        }
    }

    pub fn sound(name: &str) -> Sound {
        Sound::from_samples(name, vec![0.25; 64], 48_000).unwrap()
    }
}
