use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audio::MeterConfig;
use crate::error::ConfigError;
use crate::library::taptrap_home;
use crate::pad::MAX_GRID_SIDE;

/// Start-up settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid_width: usize,
    pub grid_height: usize,
    pub bpm: f32,
    /// Auto-stop length of a recording; 0 disables it
    pub record_beats: u32,
    pub theme: String,
    pub meter: MeterConfig,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: 5,
            grid_height: 5,
            bpm: 120.0,
            record_beats: 8,
            theme: "default".to_string(),
            meter: MeterConfig::default(),
            log_file: None,
        }
    }
}

/// Values given on the command line; they win over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub grid_width: Option<usize>,
    pub grid_height: Option<usize>,
    pub bpm: Option<f32>,
    pub record_beats: Option<u32>,
    pub theme: Option<String>,
    pub log_file: Option<PathBuf>,
}

pub fn default_config_path() -> PathBuf {
    taptrap_home().join("config.json")
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An explicit path must exist; the default path may be missing
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = default_config_path();
                if path.is_file() {
                    Self::load(&path)
                } else {
                    log::debug!("no config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(w) = overrides.grid_width {
            self.grid_width = w;
        }
        if let Some(h) = overrides.grid_height {
            self.grid_height = h;
        }
        if let Some(bpm) = overrides.bpm {
            self.bpm = bpm;
        }
        if let Some(beats) = overrides.record_beats {
            self.record_beats = beats;
        }
        if let Some(theme) = overrides.theme {
            self.theme = theme;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.grid_width > MAX_GRID_SIDE || self.grid_height > MAX_GRID_SIDE {
            return Err(ConfigError::GridTooLarge {
                width: self.grid_width,
                height: self.grid_height,
                max: MAX_GRID_SIDE,
            });
        }
        if !(self.bpm.is_finite() && self.bpm > 0.0) {
            return Err(ConfigError::InvalidBpm(self.bpm));
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.meter.clip_level) {
            return Err(ConfigError::InvalidMeter("clip_level"));
        }
        if !unit.contains(&self.meter.averaging) {
            return Err(ConfigError::InvalidMeter("averaging"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(r#"{ "bpm": 90, "meter": { "clip_lag_ms": 500 } }"#);

        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.bpm, 90.0);
        assert_eq!(settings.grid_width, 5);
        assert_eq!(settings.record_beats, 8);
        assert_eq!(settings.meter.clip_lag_ms, 500);
        assert_eq!(settings.meter.clip_level, 0.98);
    }

    #[test]
    fn test_cli_overrides_win_over_file() {
        let file = write_config(r#"{ "bpm": 90, "theme": "amber-crt", "grid_width": 4 }"#);
        let mut settings = Settings::load_or_default(Some(file.path())).unwrap();

        settings.apply_overrides(Overrides {
            bpm: Some(140.0),
            grid_height: Some(2),
            ..Default::default()
        });

        assert_eq!(settings.bpm, 140.0);
        assert_eq!(settings.grid_height, 2);
        assert_eq!(settings.grid_width, 4);
        assert_eq!(settings.theme, "amber-crt");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");

        let err = Settings::load_or_default(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let file = write_config("{ bpm: ");
        assert!(matches!(
            Settings::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());

        let grid = Settings { grid_width: 0, ..Default::default() };
        assert!(matches!(grid.validate(), Err(ConfigError::EmptyGrid { .. })));

        let mut huge = Settings::default();
        huge.apply_overrides(Overrides {
            grid_width: Some(usize::MAX),
            grid_height: Some(2),
            ..Default::default()
        });
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::GridTooLarge { max: MAX_GRID_SIDE, .. })
        ));
        let edge = Settings {
            grid_width: MAX_GRID_SIDE,
            grid_height: MAX_GRID_SIDE,
            ..Default::default()
        };
        assert!(edge.validate().is_ok());

        let bpm = Settings { bpm: -1.0, ..Default::default() };
        assert!(matches!(bpm.validate(), Err(ConfigError::InvalidBpm(_))));

        let mut meter = Settings::default();
        meter.meter.averaging = 1.5;
        assert!(matches!(meter.validate(), Err(ConfigError::InvalidMeter("averaging"))));
    }
}
