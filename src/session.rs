//! Process-wide pad state. Every UI control maps to one method here.

use std::path::Path;
use std::time::Instant;

use crate::audio::{Recorder, Sound};
use crate::config::Settings;
use crate::error::{RecorderError, SoundError, StreamError};
use crate::pad::{
    AssignmentController, CellGrid, CellId, ClickOutcome, Hotkey, HotkeyRegistry, KeyOutcome,
    LoadOutcome, PadMode, PadOutput,
};
use crate::status::StatusLog;
use crate::transport::{BeatScheduler, RecordEvent, RecordingController};

/// Where a pending sound came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundSource {
    Recording,
    Upload,
}

impl SoundSource {
    fn label(self) -> &'static str {
        match self {
            SoundSource::Recording => "recording",
            SoundSource::Upload => "upload",
        }
    }
}

pub struct Session {
    grid: CellGrid,
    hotkeys: HotkeyRegistry,
    assign: AssignmentController,
    clock: BeatScheduler,
    recording: RecordingController,
    status: StatusLog,
    output: Box<dyn PadOutput>,
    recorder: Box<dyn Recorder>,
}

impl Session {
    pub fn new(
        settings: &Settings,
        output: Box<dyn PadOutput>,
        recorder: Box<dyn Recorder>,
    ) -> Self {
        Self {
            grid: CellGrid::new(settings.grid_width, settings.grid_height),
            hotkeys: HotkeyRegistry::new(),
            assign: AssignmentController::new(),
            clock: BeatScheduler::new(settings.bpm),
            recording: RecordingController::new(settings.record_beats),
            status: StatusLog::new(),
            output,
            recorder,
        }
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn hotkeys(&self) -> &HotkeyRegistry {
        &self.hotkeys
    }

    pub fn assignment(&self) -> &AssignmentController {
        &self.assign
    }

    pub fn clock(&self) -> &BeatScheduler {
        &self.clock
    }

    pub fn recording(&self) -> &RecordingController {
        &self.recording
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    // --- cells ---

    /// Grid click: assigns the pending sound in assign mode, plays the cell otherwise
    pub fn click_cell(&mut self, id: CellId) -> ClickOutcome {
        let Some(cell) = self.grid.cell_mut(id) else {
            return ClickOutcome::Ignored;
        };
        let outcome = self.assign.click_cell(cell, self.output.as_ref());
        if let ClickOutcome::Assigned { replaced } = outcome {
            if replaced {
                self.status.info(format!("sound assigned to cell {} (replaced)", id));
            } else {
                self.status.info(format!("sound assigned to cell {}", id));
            }
        }
        outcome
    }

    /// Panic button: silence every cell and the preview
    pub fn stop_all(&mut self) {
        self.output.stop_all();
        self.status.info("all voices stopped");
    }

    pub fn cycle_mode(&mut self, id: CellId) -> Option<PadMode> {
        let mode = self.grid.cell_mut(id)?.cycle_mode();
        log::debug!("cell {} mode {}", id, mode.label());
        Some(mode)
    }

    // --- hotkeys ---

    pub fn begin_hotkey_capture(&mut self, id: CellId) {
        if self.grid.cell(id).is_none() {
            return;
        }
        self.hotkeys.begin_capture(id);
        self.status.info(format!("press a key for cell {}", id));
    }

    pub fn cancel_hotkey_capture(&mut self) -> bool {
        self.hotkeys.cancel_capture().is_some()
    }

    pub fn clear_hotkey(&mut self, id: CellId) {
        if let Some(key) = self.hotkeys.unbind(id, &mut self.grid) {
            self.status.info(format!("key {} unbound from cell {}", key, id));
        }
    }

    /// A printable key press: finishes a capture or triggers a bound cell
    pub fn press_key(&mut self, c: char) -> KeyOutcome {
        let Some(key) = Hotkey::new(c) else {
            return KeyOutcome::Unbound;
        };
        let outcome = self.hotkeys.on_key(key, &mut self.grid);
        match outcome {
            KeyOutcome::Bound { cell, evicted, .. } => match evicted {
                Some(other) => self.status.info(format!(
                    "key {} bound to cell {} (taken from cell {})",
                    key, cell, other
                )),
                None => self.status.info(format!("key {} bound to cell {}", key, cell)),
            },
            KeyOutcome::Trigger(cell) => {
                if let Some(c) = self.grid.cell(cell) {
                    c.run(self.output.as_ref());
                }
            }
            KeyOutcome::Unbound => {}
        }
        outcome
    }

    // --- pending sound ---

    pub fn begin_assign(&mut self) -> bool {
        let started = self.assign.begin_assign();
        if started {
            self.status.info("click a cell to assign the sound");
        }
        started
    }

    pub fn cancel_assign(&mut self) -> bool {
        let cancelled = self.assign.cancel_assign();
        if cancelled {
            self.status.info("assign cancelled");
        }
        cancelled
    }

    pub fn preview_pending(&mut self) -> bool {
        self.assign.preview_pending(self.output.as_ref())
    }

    /// Audition a sound that is not loaded anywhere (browser preview)
    pub fn preview_sound(&mut self, sound: &Sound) {
        self.output.preview(sound);
    }

    /// Browser preview of a file on disk
    pub fn preview_file(&mut self, path: &Path) -> Result<(), SoundError> {
        match Sound::load_file(path) {
            Ok(sound) => {
                self.preview_sound(&sound);
                Ok(())
            }
            Err(e) => {
                self.status
                    .error(format!("could not preview {}: {}", path.display(), e));
                Err(e)
            }
        }
    }

    pub fn load_sound(&mut self, sound: Sound, source: SoundSource) {
        let name = sound.name().to_string();
        if self.assign.load_pending(sound) == LoadOutcome::CancelledAssign {
            self.status.warn("assign cancelled: a new sound was loaded");
        }
        self.status
            .info(format!("sound from {} loaded ({})", source.label(), name));
    }

    /// The "upload" control: decode a file and make it the pending sound
    pub fn load_file(&mut self, path: &Path) -> Result<(), SoundError> {
        match Sound::load_file(path) {
            Ok(sound) => {
                self.load_sound(sound, SoundSource::Upload);
                Ok(())
            }
            Err(e) => {
                self.status
                    .error(format!("could not load {}: {}", path.display(), e));
                Err(e)
            }
        }
    }

    // --- tempo ---

    pub fn set_bpm(&mut self, bpm: f32) -> f32 {
        let bpm = self.clock.set_bpm(bpm);
        self.status.info(format!("tempo {} bpm", bpm));
        bpm
    }

    pub fn nudge_bpm(&mut self, delta: f32) -> f32 {
        self.set_bpm(self.clock.bpm() + delta)
    }

    pub fn nudge_record_beats(&mut self, delta: i32) -> u32 {
        let beats = self.recording.nudge_record_beats(delta);
        self.report_record_beats(beats);
        beats
    }

    fn report_record_beats(&mut self, beats: u32) {
        if beats == 0 {
            self.status.info("recording stops manually");
        } else {
            self.status.info(format!("recording stops after {} beats", beats));
        }
    }

    // --- recording ---

    pub fn toggle_recording(&mut self, now: Instant) {
        // No microphone: refuse before the count-in
        if self.recording.is_idle() && !self.recorder.is_available() {
            self.handle_record_result(Err(RecorderError::NoInput));
            return;
        }
        let result = self
            .recording
            .toggle(now, &self.clock, self.recorder.as_mut());
        self.handle_record_result(result.map(Some));
    }

    /// Called every UI frame: drains captured audio and fires due beat timers
    pub fn tick(&mut self, now: Instant) {
        self.recorder.poll();
        let result = self
            .recording
            .tick(now, &self.clock, self.recorder.as_mut());
        self.handle_record_result(result);
    }

    pub fn record_label(&self) -> Option<String> {
        self.recording.label()
    }

    fn handle_record_result(&mut self, result: Result<Option<RecordEvent>, RecorderError>) {
        match result {
            Ok(Some(RecordEvent::CountIn(n))) => log::debug!("count-in {}", n),
            Ok(Some(RecordEvent::Started)) => self.status.info("recording"),
            Ok(Some(RecordEvent::Captured(sound))) => {
                self.load_sound(sound, SoundSource::Recording)
            }
            Ok(Some(RecordEvent::Cancelled)) => self.status.info("recording cancelled"),
            Ok(None) => {}
            Err(e) => self.status.error(format!("recording failed: {}", e)),
        }
    }

    /// Microphone could not be opened; metering and recording stay off
    pub fn report_stream_failure(&mut self, err: &StreamError) {
        self.status.error(format!(
            "microphone unavailable ({}); metering and recording disabled",
            err
        ));
    }
}
