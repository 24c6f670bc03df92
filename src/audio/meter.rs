use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Meter ballistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Absolute sample value treated as clipping
    pub clip_level: f32,
    /// Per-frame decay factor applied to the displayed volume
    pub averaging: f32,
    /// How long the clip indicator stays lit
    pub clip_lag_ms: u64,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            clip_level: 0.98,
            averaging: 0.95,
            clip_lag_ms: 750,
        }
    }
}

impl MeterConfig {
    pub fn clip_lag(&self) -> Duration {
        Duration::from_millis(self.clip_lag_ms)
    }
}

/// RMS level with instant attack, exponential release and a latched clip flag
#[derive(Debug, Clone, Copy)]
pub struct LevelMeter {
    config: MeterConfig,
    volume: f32,
    clipping: bool,
    last_clip: Option<Instant>,
}

impl LevelMeter {
    pub fn new(config: MeterConfig) -> Self {
        Self {
            config,
            volume: 0.0,
            clipping: false,
            last_clip: None,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Feed one frame of samples from the input stream
    pub fn process(&mut self, frame: &[f32], now: Instant) {
        if frame.is_empty() {
            return;
        }

        let mut sum = 0.0f32;
        for &x in frame {
            if x.abs() >= self.config.clip_level {
                self.clipping = true;
                self.last_clip = Some(now);
            }
            sum += x * x;
        }
        let rms = (sum / frame.len() as f32).sqrt();

        self.volume = rms.max(self.volume * self.config.averaging);
    }

    /// True while the last clip is younger than the clip lag; clears the latch otherwise
    pub fn check_clipping(&mut self, now: Instant) -> bool {
        if !self.clipping {
            return false;
        }
        let expired = self
            .last_clip
            .map(|t| now.saturating_duration_since(t) >= self.config.clip_lag())
            .unwrap_or(true);
        if expired {
            self.clipping = false;
        }
        self.clipping
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new(MeterConfig::default())
    }
}

/// Audio-side owner of the meter. Publishes a snapshot after every frame.
pub struct MeterWriter {
    meter: LevelMeter,
    shared: Arc<RwLock<LevelMeter>>,
}

impl MeterWriter {
    pub fn process(&mut self, frame: &[f32], now: Instant) {
        self.meter.process(frame, now);
        // Skip the publish if the render loop holds the lock; next frame catches up
        if let Some(mut snapshot) = self.shared.try_write() {
            *snapshot = self.meter;
        }
    }
}

/// Render-side view of the meter
#[derive(Clone)]
pub struct MeterReader {
    shared: Arc<RwLock<LevelMeter>>,
}

/// What the meter bar draws for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    pub volume: f32,
    pub clipping: bool,
}

impl MeterReader {
    pub fn read(&self, now: Instant) -> MeterReading {
        let mut snapshot = *self.shared.read();
        MeterReading {
            volume: snapshot.volume().min(1.0),
            clipping: snapshot.check_clipping(now),
        }
    }
}

pub fn meter_pair(config: MeterConfig) -> (MeterWriter, MeterReader) {
    let meter = LevelMeter::new(config);
    let shared = Arc::new(RwLock::new(meter));
    (
        MeterWriter {
            meter,
            shared: shared.clone(),
        },
        MeterReader { shared },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_clip_latch_holds_for_lag() {
        let mut meter = LevelMeter::default();
        let t0 = Instant::now();
        let mut frame = [0.0f32; 512];
        frame[100] = 1.0;

        meter.process(&frame, t0);

        assert!(meter.check_clipping(t0 + ms(500)));
        assert!(meter.check_clipping(t0 + ms(749)));
        assert!(!meter.check_clipping(t0 + ms(750)));
        // Stays cleared
        assert!(!meter.check_clipping(t0 + ms(751)));
    }

    #[test]
    fn test_clip_threshold_is_inclusive() {
        let mut meter = LevelMeter::default();
        let t0 = Instant::now();

        meter.process(&[0.97, -0.5], t0);
        assert!(!meter.check_clipping(t0));

        meter.process(&[-0.98], t0);
        assert!(meter.check_clipping(t0));
    }

    #[test]
    fn test_fast_attack_slow_release() {
        let mut meter = LevelMeter::default();
        let t0 = Instant::now();

        meter.process(&[0.5; 512], t0);
        assert!((meter.volume() - 0.5).abs() < 1e-6);

        meter.process(&[0.0; 512], t0);
        assert!((meter.volume() - 0.475).abs() < 1e-6);

        // A louder frame replaces the decayed value at once
        meter.process(&[0.8; 512], t0);
        assert!((meter.volume() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_empty_frame_is_ignored() {
        let mut meter = LevelMeter::default();
        meter.process(&[0.3; 4], Instant::now());
        meter.process(&[], Instant::now());
        assert!((meter.volume() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_reader_sees_published_snapshot() {
        let (mut writer, reader) = meter_pair(MeterConfig::default());
        let t0 = Instant::now();

        assert_eq!(reader.read(t0), MeterReading { volume: 0.0, clipping: false });

        writer.process(&[1.5; 8], t0);
        let reading = reader.read(t0 + ms(100));
        assert_eq!(reading.volume, 1.0);
        assert!(reading.clipping);

        // Reading never clears the shared latch for the next frame
        assert!(!reader.read(t0 + ms(900)).clipping);
        assert!(reader.read(t0 + ms(200)).clipping);
    }
}
