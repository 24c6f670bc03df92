pub mod clock;
pub mod recording;

pub use clock::{BeatScheduler, BeatTimer};
pub use recording::{RecordEvent, RecordingController};
