pub mod engine;
pub mod input;
pub mod meter;
pub mod recorder;
pub mod sound;
pub mod voice;

pub use engine::{AudioEngine, PlaybackState};
pub use input::MicInput;
pub use meter::{MeterConfig, MeterReader, MeterReading};
pub use recorder::{MicRecorder, Recorder};
pub use sound::{format_tag, Sound, SUPPORTED_FORMATS};
