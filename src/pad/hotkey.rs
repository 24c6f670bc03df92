use std::collections::HashMap;
use std::fmt;

use super::{CellGrid, CellId};

/// A keyboard key that can be bound to a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hotkey(char);

impl Hotkey {
    /// Printable characters only; control characters are reserved for the UI
    pub fn new(c: char) -> Option<Self> {
        (!c.is_control()).then_some(Self(c))
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ' ' => write!(f, "SPC"),
            c => write!(f, "{}", c),
        }
    }
}

/// Result of feeding a key press to the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The waiting cell got the key
    Bound {
        cell: CellId,
        /// Cell that lost the key to this binding
        evicted: Option<CellId>,
        /// Key the cell held before
        replaced: Option<Hotkey>,
    },
    /// The key belongs to a cell that should run
    Trigger(CellId),
    /// Nobody waits for and nobody owns this key
    Unbound,
}

/// Bidirectional key <-> cell binding.
///
/// The registry is the only writer of both the key map and every
/// `Cell::hotkey`, so the relation stays injective and mirrored.
pub struct HotkeyRegistry {
    bindings: HashMap<Hotkey, CellId>,
    waiting: Option<CellId>,
}

impl HotkeyRegistry {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            waiting: None,
        }
    }

    /// Cell waiting for its next key, if any
    pub fn waiting(&self) -> Option<CellId> {
        self.waiting
    }

    /// Make `cell` the sole capture target. Returns the cell that was waiting before.
    pub fn begin_capture(&mut self, cell: CellId) -> Option<CellId> {
        self.waiting.replace(cell)
    }

    pub fn cancel_capture(&mut self) -> Option<CellId> {
        self.waiting.take()
    }

    pub fn on_key(&mut self, key: Hotkey, grid: &mut CellGrid) -> KeyOutcome {
        let Some(cell) = self.waiting.take() else {
            return match self.bindings.get(&key) {
                Some(&target) => KeyOutcome::Trigger(target),
                None => KeyOutcome::Unbound,
            };
        };

        let Some(old) = grid.cell(cell).map(|c| c.hotkey()) else {
            // Stale capture target; nothing to bind
            return KeyOutcome::Unbound;
        };

        let replaced = old.filter(|&k| k != key);
        if let Some(old_key) = replaced {
            self.bindings.remove(&old_key);
        }

        let evicted = match self.bindings.insert(key, cell) {
            Some(other) if other != cell => {
                if let Some(c) = grid.cell_mut(other) {
                    c.set_hotkey(None);
                }
                Some(other)
            }
            _ => None,
        };

        if let Some(c) = grid.cell_mut(cell) {
            c.set_hotkey(Some(key));
        }

        KeyOutcome::Bound {
            cell,
            evicted,
            replaced,
        }
    }

    /// Drop a cell's binding. Also ends capture if that cell was waiting.
    pub fn unbind(&mut self, cell: CellId, grid: &mut CellGrid) -> Option<Hotkey> {
        if self.waiting == Some(cell) {
            self.waiting = None;
        }
        let key = grid.cell(cell)?.hotkey()?;
        self.bindings.remove(&key);
        if let Some(c) = grid.cell_mut(cell) {
            c.set_hotkey(None);
        }
        Some(key)
    }
}

impl Default for HotkeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
