use crate::audio::Sound;

use super::{Cell, PadOutput};

/// Pending sound and assign mode, folded into one value so that
/// "assigning without a pending sound" cannot be represented.
#[derive(Debug, Default)]
enum AssignState {
    #[default]
    Empty,
    Pending(Sound),
    Assigning(Sound),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// A new sound arrived mid-assignment; assign mode was left
    CancelledAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The pending sound moved into the cell
    Assigned { replaced: bool },
    Triggered,
    /// Plain click on an empty cell
    Ignored,
}

/// Routes grid clicks either to playback or to consuming the pending sound
#[derive(Debug, Default)]
pub struct AssignmentController {
    state: AssignState,
}

impl AssignmentController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&Sound> {
        match &self.state {
            AssignState::Empty => None,
            AssignState::Pending(s) | AssignState::Assigning(s) => Some(s),
        }
    }

    pub fn is_assigning(&self) -> bool {
        matches!(self.state, AssignState::Assigning(_))
    }

    /// Replace the pending sound, whatever state we are in
    pub fn load_pending(&mut self, sound: Sound) -> LoadOutcome {
        let was_assigning = self.is_assigning();
        self.state = AssignState::Pending(sound);
        if was_assigning {
            LoadOutcome::CancelledAssign
        } else {
            LoadOutcome::Loaded
        }
    }

    /// Enter assign mode. Only possible with a pending sound and not already assigning.
    pub fn begin_assign(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            AssignState::Pending(sound) => {
                self.state = AssignState::Assigning(sound);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Leave assign mode and keep the sound pending
    pub fn cancel_assign(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            AssignState::Assigning(sound) => {
                self.state = AssignState::Pending(sound);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    pub fn click_cell(&mut self, cell: &mut Cell, out: &dyn PadOutput) -> ClickOutcome {
        match std::mem::take(&mut self.state) {
            AssignState::Assigning(sound) => {
                let replaced = cell.assign(sound).is_some();
                if replaced {
                    out.stop(cell.id());
                }
                ClickOutcome::Assigned { replaced }
            }
            other => {
                self.state = other;
                if cell.run(out) {
                    ClickOutcome::Triggered
                } else {
                    ClickOutcome::Ignored
                }
            }
        }
    }

    pub fn preview_pending(&self, out: &dyn PadOutput) -> bool {
        match self.pending() {
            Some(sound) => {
                out.preview(sound);
                true
            }
            None => false,
        }
    }
}
