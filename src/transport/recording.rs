use std::time::Instant;

use super::{BeatScheduler, BeatTimer};
use crate::audio::{Recorder, Sound};
use crate::error::RecorderError;

/// Beats counted down before the recorder starts
pub const COUNT_IN_BEATS: u8 = 4;

/// Longest auto-stop window selectable from the UI
pub const MAX_RECORD_BEATS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Idle,
    /// `remaining` is the number currently on screen
    CountIn { remaining: u8, next: BeatTimer },
    Recording { auto_stop: Option<BeatTimer> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    /// Countdown shows a new number
    CountIn(u8),
    Started,
    Captured(Sound),
    /// Toggle during count-in; the recorder was never started
    Cancelled,
}

/// Count-in, capture and auto-stop around a [`Recorder`]
pub struct RecordingController {
    state: RecordState,
    record_beats: u32,
}

impl RecordingController {
    pub fn new(record_beats: u32) -> Self {
        Self {
            state: RecordState::Idle,
            record_beats: record_beats.min(MAX_RECORD_BEATS),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == RecordState::Idle
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecordState::Recording { .. })
    }

    /// Auto-stop length in beats; 0 records until toggled off
    pub fn record_beats(&self) -> u32 {
        self.record_beats
    }

    /// Takes effect on the next recording
    pub fn set_record_beats(&mut self, beats: u32) -> u32 {
        self.record_beats = beats.min(MAX_RECORD_BEATS);
        self.record_beats
    }

    pub fn nudge_record_beats(&mut self, delta: i32) -> u32 {
        let beats = (self.record_beats as i64 + delta as i64).max(0) as u32;
        self.set_record_beats(beats)
    }

    /// Text for the record indicator
    pub fn label(&self) -> Option<String> {
        match self.state {
            RecordState::Idle => None,
            RecordState::CountIn { remaining, .. } => Some(remaining.to_string()),
            RecordState::Recording { .. } => Some("REC".to_string()),
        }
    }

    pub fn toggle(
        &mut self,
        now: Instant,
        clock: &BeatScheduler,
        recorder: &mut dyn Recorder,
    ) -> Result<RecordEvent, RecorderError> {
        match self.state {
            RecordState::Idle => {
                self.state = RecordState::CountIn {
                    remaining: COUNT_IN_BEATS,
                    next: clock.await_beats(1, now),
                };
                Ok(RecordEvent::CountIn(COUNT_IN_BEATS))
            }
            RecordState::CountIn { .. } => {
                self.state = RecordState::Idle;
                Ok(RecordEvent::Cancelled)
            }
            RecordState::Recording { .. } => self.finish(recorder),
        }
    }

    /// Advance timers. Overdue count-in beats are all fired; the last event is returned.
    pub fn tick(
        &mut self,
        now: Instant,
        clock: &BeatScheduler,
        recorder: &mut dyn Recorder,
    ) -> Result<Option<RecordEvent>, RecorderError> {
        let mut last = None;
        loop {
            match self.state {
                RecordState::CountIn { remaining, next } if next.is_due(now) => {
                    if remaining > 1 {
                        // Chain from the previous deadline, not from `now`
                        self.state = RecordState::CountIn {
                            remaining: remaining - 1,
                            next: clock.await_beats(1, next.deadline()),
                        };
                        last = Some(RecordEvent::CountIn(remaining - 1));
                        continue;
                    }
                    if let Err(e) = recorder.start() {
                        self.state = RecordState::Idle;
                        return Err(e);
                    }
                    let beats = self.record_beats;
                    self.state = RecordState::Recording {
                        auto_stop: (beats > 0).then(|| clock.await_beats(beats, now)),
                    };
                    return Ok(Some(RecordEvent::Started));
                }
                RecordState::Recording {
                    auto_stop: Some(timer),
                } if timer.is_due(now) => {
                    return self.finish(recorder).map(Some);
                }
                _ => return Ok(last),
            }
        }
    }

    fn finish(&mut self, recorder: &mut dyn Recorder) -> Result<RecordEvent, RecorderError> {
        self.state = RecordState::Idle;
        recorder.stop().map(RecordEvent::Captured)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;

    /// Recorder that counts calls and returns a fixed take
    #[derive(Default)]
    pub(crate) struct FakeRecorder {
        pub starts: usize,
        pub stops: usize,
        pub fail_start: bool,
        /// Takes end with `EmptyCapture`
        pub fail_stop: bool,
        pub unavailable: bool,
        pub recording: bool,
    }

    impl Recorder for FakeRecorder {
        fn start(&mut self) -> Result<(), RecorderError> {
            if self.fail_start || self.unavailable {
                return Err(RecorderError::NoInput);
            }
            self.starts += 1;
            self.recording = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<Sound, RecorderError> {
            if !self.recording {
                return Err(RecorderError::NotRecording);
            }
            self.stops += 1;
            self.recording = false;
            if self.fail_stop {
                return Err(RecorderError::EmptyCapture);
            }
            Ok(Sound::from_samples("take", vec![0.5; 32], 48_000).unwrap())
        }

        fn is_recording(&self) -> bool {
            self.recording
        }

        fn is_available(&self) -> bool {
            !self.unavailable
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_count_in_at_120_bpm() {
        let clock = BeatScheduler::new(120.0);
        let mut rec = FakeRecorder::default();
        let mut ctl = RecordingController::new(8);
        let t0 = Instant::now();

        assert_eq!(ctl.toggle(t0, &clock, &mut rec).unwrap(), RecordEvent::CountIn(4));
        assert_eq!(ctl.label().as_deref(), Some("4"));

        assert_eq!(ctl.tick(t0 + ms(499), &clock, &mut rec).unwrap(), None);
        let mut labels = vec![ctl.label().unwrap()];
        for step in 1..=3 {
            let event = ctl.tick(t0 + ms(500 * step), &clock, &mut rec).unwrap();
            assert_eq!(event, Some(RecordEvent::CountIn(4 - step as u8)));
            labels.push(ctl.label().unwrap());
        }
        assert_eq!(labels, vec!["4", "3", "2", "1"]);
        assert_eq!(rec.starts, 0);

        assert_eq!(
            ctl.tick(t0 + ms(2000), &clock, &mut rec).unwrap(),
            Some(RecordEvent::Started)
        );
        assert_eq!(rec.starts, 1);
        assert!(ctl.is_recording());
    }

    #[test]
    fn test_auto_stop_after_record_beats() {
        let clock = BeatScheduler::new(120.0);
        let mut rec = FakeRecorder::default();
        let mut ctl = RecordingController::new(8);
        let t0 = Instant::now();

        ctl.toggle(t0, &clock, &mut rec).unwrap();
        for step in 1..=4 {
            ctl.tick(t0 + ms(500 * step), &clock, &mut rec).unwrap();
        }
        assert!(ctl.is_recording());

        assert_eq!(ctl.tick(t0 + ms(5999), &clock, &mut rec).unwrap(), None);
        let event = ctl.tick(t0 + ms(6000), &clock, &mut rec).unwrap();

        assert!(matches!(event, Some(RecordEvent::Captured(_))));
        assert_eq!(rec.stops, 1);
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_stalled_loop_catches_up() {
        let clock = BeatScheduler::new(120.0);
        let mut rec = FakeRecorder::default();
        let mut ctl = RecordingController::new(0);
        let t0 = Instant::now();

        ctl.toggle(t0, &clock, &mut rec).unwrap();
        let event = ctl.tick(t0 + ms(2300), &clock, &mut rec).unwrap();

        assert_eq!(event, Some(RecordEvent::Started));
        // No auto-stop with zero record beats
        assert_eq!(ctl.state, RecordState::Recording { auto_stop: None });
        assert_eq!(ctl.tick(t0 + ms(60_000), &clock, &mut rec).unwrap(), None);
    }

    #[test]
    fn test_manual_stop() {
        let clock = BeatScheduler::new(120.0);
        let mut rec = FakeRecorder::default();
        let mut ctl = RecordingController::new(8);
        let t0 = Instant::now();

        ctl.toggle(t0, &clock, &mut rec).unwrap();
        ctl.tick(t0 + ms(2000), &clock, &mut rec).unwrap();
        let event = ctl.toggle(t0 + ms(2500), &clock, &mut rec).unwrap();

        assert!(matches!(event, RecordEvent::Captured(s) if s.name() == "take"));
        assert!(ctl.is_idle());
        // The dropped auto-stop must not fire later
        assert_eq!(ctl.tick(t0 + ms(6000), &clock, &mut rec).unwrap(), None);
        assert_eq!(rec.stops, 1);
    }

    #[test]
    fn test_toggle_during_count_in_cancels() {
        let clock = BeatScheduler::new(120.0);
        let mut rec = FakeRecorder::default();
        let mut ctl = RecordingController::new(8);
        let t0 = Instant::now();

        ctl.toggle(t0, &clock, &mut rec).unwrap();
        ctl.tick(t0 + ms(600), &clock, &mut rec).unwrap();
        assert_eq!(
            ctl.toggle(t0 + ms(700), &clock, &mut rec).unwrap(),
            RecordEvent::Cancelled
        );

        assert!(ctl.is_idle());
        assert_eq!(ctl.tick(t0 + ms(5000), &clock, &mut rec).unwrap(), None);
        assert_eq!((rec.starts, rec.stops), (0, 0));
    }

    #[test]
    fn test_start_failure_returns_to_idle() {
        let clock = BeatScheduler::new(120.0);
        let mut rec = FakeRecorder {
            fail_start: true,
            ..Default::default()
        };
        let mut ctl = RecordingController::new(8);
        let t0 = Instant::now();

        ctl.toggle(t0, &clock, &mut rec).unwrap();
        let result = ctl.tick(t0 + ms(2000), &clock, &mut rec);

        assert!(matches!(result, Err(RecorderError::NoInput)));
        assert!(ctl.is_idle());
        assert_eq!(ctl.label(), None);
    }

    #[test]
    fn test_stop_failure_returns_to_idle() {
        let clock = BeatScheduler::new(120.0);
        let mut rec = FakeRecorder {
            fail_stop: true,
            ..Default::default()
        };
        let mut ctl = RecordingController::new(8);
        let t0 = Instant::now();

        ctl.toggle(t0, &clock, &mut rec).unwrap();
        ctl.tick(t0 + ms(2000), &clock, &mut rec).unwrap();
        let result = ctl.tick(t0 + ms(6000), &clock, &mut rec);

        assert!(matches!(result, Err(RecorderError::EmptyCapture)));
        assert!(ctl.is_idle());
        assert_eq!(rec.stops, 1);
        assert_eq!(ctl.tick(t0 + ms(9000), &clock, &mut rec).unwrap(), None);
    }

    #[test]
    fn test_record_beats_are_bounded() {
        let mut ctl = RecordingController::new(200);
        assert_eq!(ctl.record_beats(), MAX_RECORD_BEATS);
        assert_eq!(ctl.set_record_beats(3), 3);
        assert_eq!(ctl.nudge_record_beats(-5), 0);
        assert_eq!(ctl.nudge_record_beats(1), 1);
    }
}
