use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::Receiver;

use super::Sound;
use crate::error::RecorderError;

/// Capture device driven by the recording controller
pub trait Recorder {
    fn start(&mut self) -> Result<(), RecorderError>;

    /// Finish the take and hand back the captured sound
    fn stop(&mut self) -> Result<Sound, RecorderError>;

    fn is_recording(&self) -> bool;

    /// False when no capture device exists; starting would always fail
    fn is_available(&self) -> bool {
        true
    }

    /// Pull pending audio off the input thread. Called every UI tick.
    fn poll(&mut self) {}
}

/// Connection to the input stream: the armed flag gates the callback,
/// captured chunks come back over the channel.
pub struct CaptureLink {
    pub armed: Arc<AtomicBool>,
    pub chunks: Receiver<Vec<f32>>,
    /// Chunks the input thread could not queue
    pub dropped: Arc<AtomicUsize>,
    pub sample_rate: u32,
}

/// Records from the microphone input stream
pub struct MicRecorder {
    link: Option<CaptureLink>,
    buffer: Vec<f32>,
    takes: usize,
}

impl MicRecorder {
    pub fn new(link: CaptureLink) -> Self {
        Self {
            link: Some(link),
            buffer: Vec::new(),
            takes: 0,
        }
    }

    /// Recorder for a session without a microphone; every start fails
    pub fn unavailable() -> Self {
        Self {
            link: None,
            buffer: Vec::new(),
            takes: 0,
        }
    }

    fn drain(&mut self) {
        if let Some(link) = &self.link {
            while let Ok(chunk) = link.chunks.try_recv() {
                self.buffer.extend_from_slice(&chunk);
            }
        }
    }
}

impl Recorder for MicRecorder {
    fn start(&mut self) -> Result<(), RecorderError> {
        let link = self.link.as_ref().ok_or(RecorderError::NoInput)?;
        if link.armed.load(Ordering::Acquire) {
            return Err(RecorderError::AlreadyRecording);
        }
        // Throw away anything left over from a previous take
        while link.chunks.try_recv().is_ok() {}
        link.dropped.store(0, Ordering::Relaxed);
        self.buffer.clear();
        link.armed.store(true, Ordering::Release);
        log::info!("recording started");
        Ok(())
    }

    fn stop(&mut self) -> Result<Sound, RecorderError> {
        let (sample_rate, was_armed, dropped) = match &self.link {
            Some(link) => (
                link.sample_rate,
                link.armed.swap(false, Ordering::AcqRel),
                link.dropped.swap(0, Ordering::Relaxed),
            ),
            None => return Err(RecorderError::NoInput),
        };
        if !was_armed {
            return Err(RecorderError::NotRecording);
        }
        self.drain();
        if dropped > 0 {
            log::warn!("capture channel overflowed: {} chunks lost, take is truncated", dropped);
        }

        self.takes += 1;
        let samples = std::mem::take(&mut self.buffer);
        log::info!("recording stopped: {} samples", samples.len());
        Sound::from_samples(format!("take {:02}", self.takes), samples, sample_rate)
            .map_err(|_| RecorderError::EmptyCapture)
    }

    fn is_recording(&self) -> bool {
        self.link
            .as_ref()
            .map(|l| l.armed.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    fn is_available(&self) -> bool {
        self.link.is_some()
    }

    fn poll(&mut self) {
        if self.is_recording() {
            self.drain();
        }
    }
}
