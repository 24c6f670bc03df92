use std::time::{Duration, Instant};

pub const MIN_BPM: f32 = 20.0;
pub const MAX_BPM: f32 = 300.0;

/// Converts BPM into beat lengths and arms beat timers
#[derive(Debug, Clone)]
pub struct BeatScheduler {
    bpm: f32,
    beat: Duration,
}

impl BeatScheduler {
    pub fn new(bpm: f32) -> Self {
        let mut clock = Self {
            bpm: 120.0,
            beat: Duration::ZERO,
        };
        clock.set_bpm(bpm);
        clock
    }

    fn recalculate_timing(&mut self) {
        // 1 beat = 60 / bpm seconds
        self.beat = Duration::from_secs_f64(60.0 / self.bpm as f64);
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Clamp and apply a new tempo. Only timers armed afterwards see it.
    pub fn set_bpm(&mut self, bpm: f32) -> f32 {
        if bpm.is_finite() {
            self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
            self.recalculate_timing();
        }
        self.bpm
    }

    pub fn nudge_bpm(&mut self, delta: f32) -> f32 {
        self.set_bpm(self.bpm + delta)
    }

    pub fn beat_duration_ms(&self) -> f64 {
        self.beat.as_secs_f64() * 1000.0
    }

    pub fn beats(&self, n: u32) -> Duration {
        self.beat * n
    }

    /// Timer that completes `n` beats after `from`, at the current tempo
    pub fn await_beats(&self, n: u32, from: Instant) -> BeatTimer {
        BeatTimer {
            deadline: from + self.beats(n),
        }
    }
}

impl Default for BeatScheduler {
    fn default() -> Self {
        Self::new(120.0)
    }
}

/// A pending beat wait, polled by the UI loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatTimer {
    deadline: Instant,
}

impl BeatTimer {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_duration_at_120() {
        let clock = BeatScheduler::new(120.0);
        assert_eq!(clock.beats(1), Duration::from_millis(500));
        assert_eq!(clock.beat_duration_ms(), 500.0);
        assert_eq!(clock.beats(8), Duration::from_millis(4000));
    }

    #[test]
    fn test_bpm_is_clamped_and_non_finite_ignored() {
        let mut clock = BeatScheduler::new(120.0);
        assert_eq!(clock.set_bpm(1000.0), MAX_BPM);
        assert_eq!(clock.set_bpm(-5.0), MIN_BPM);
        assert_eq!(clock.set_bpm(f32::NAN), MIN_BPM);
        assert_eq!(clock.nudge_bpm(10.0), 30.0);
    }

    #[test]
    fn test_armed_timer_keeps_tempo_of_arming() {
        let mut clock = BeatScheduler::new(120.0);
        let t0 = Instant::now();
        let timer = clock.await_beats(2, t0);

        clock.set_bpm(60.0);

        assert_eq!(timer.deadline(), t0 + Duration::from_millis(1000));
        assert!(!timer.is_due(t0 + Duration::from_millis(999)));
        assert!(timer.is_due(t0 + Duration::from_millis(1000)));
        assert_eq!(clock.await_beats(2, t0).deadline(), t0 + Duration::from_secs(2));
    }
}
