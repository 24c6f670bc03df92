//! Error types for sound loading, recording, stream acquisition and settings.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while turning raw bytes into a playable sound.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Failed to read the sound file.
    #[error("failed to read sound file: {0}")]
    Io(#[from] std::io::Error),

    /// The WAV container or its sample data is malformed.
    #[error("failed to decode WAV data: {0}")]
    Wav(#[from] hound::Error),

    /// The format tag (file extension) has no decoder.
    #[error("unsupported sound format '{0}'")]
    UnsupportedFormat(String),

    /// Decoding succeeded but produced no samples.
    #[error("sound contains no samples")]
    Empty,
}

/// Errors reported by a [`Recorder`](crate::audio::Recorder).
#[derive(Debug, Error)]
pub enum RecorderError {
    /// No microphone stream was acquired this session.
    #[error("no microphone input available")]
    NoInput,

    #[error("recorder is already capturing")]
    AlreadyRecording,

    #[error("recorder is not capturing")]
    NotRecording,

    /// The take ended without a single captured sample.
    #[error("recording captured no audio")]
    EmptyCapture,
}

/// Failure to acquire the microphone input stream.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("no default input device")]
    NoInputDevice,

    #[error("no default input config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("unsupported input sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
}

/// Errors while loading or validating the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("grid must be at least 1x1 (got {width}x{height})")]
    EmptyGrid { width: usize, height: usize },

    #[error("grid can be at most {max}x{max} (got {width}x{height})")]
    GridTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("bpm must be a positive number (got {0})")]
    InvalidBpm(f32),

    #[error("meter {0} must be between 0 and 1")]
    InvalidMeter(&'static str),
}
