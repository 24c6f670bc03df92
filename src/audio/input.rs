use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{bounded, Sender};

use super::meter::{meter_pair, MeterConfig, MeterReader, MeterWriter};
use super::recorder::CaptureLink;
use crate::error::StreamError;

/// Samples per meter frame
pub const FRAME_SIZE: usize = 512;

/// Capture chunks buffered between the input callback and the recorder
const CAPTURE_CHANNEL_CAPACITY: usize = 1024;

/// Slices a sample stream into fixed-size frames without allocating
pub struct FrameAccumulator {
    buf: [f32; FRAME_SIZE],
    len: usize,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self {
            buf: [0.0; FRAME_SIZE],
            len: 0,
        }
    }

    pub fn push(&mut self, sample: f32, mut on_frame: impl FnMut(&[f32])) {
        self.buf[self.len] = sample;
        self.len += 1;
        if self.len == FRAME_SIZE {
            on_frame(&self.buf);
            self.len = 0;
        }
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Running microphone stream. Dropping it stops the input.
pub struct MicInput {
    _stream: Stream,
    meter: MeterReader,
    capture: Option<CaptureLink>,
}

impl MicInput {
    /// Open the default input device
    pub fn open(meter_config: MeterConfig) -> Result<Self, StreamError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(StreamError::NoInputDevice)?;

        let supported = device.default_input_config()?;
        let format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;

        let (writer, meter) = meter_pair(meter_config);
        let armed = Arc::new(AtomicBool::new(false));
        let dropped = Arc::new(AtomicUsize::new(0));
        let (chunk_tx, chunk_rx) = bounded(CAPTURE_CHANNEL_CAPACITY);
        let sink = CaptureSink {
            chunks: chunk_tx,
            dropped: dropped.clone(),
        };

        let stream = match format {
            SampleFormat::F32 => {
                build_stream::<f32>(&device, &config, writer, armed.clone(), sink)?
            }
            SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, writer, armed.clone(), sink)?
            }
            SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, writer, armed.clone(), sink)?
            }
            other => return Err(StreamError::UnsupportedFormat(other)),
        };
        stream.play()?;

        log::info!(
            "input stream open on {} ({} Hz, {} ch, {:?})",
            device.name().unwrap_or_else(|_| "unknown device".to_string()),
            sample_rate,
            config.channels,
            format
        );

        Ok(Self {
            _stream: stream,
            meter,
            capture: Some(CaptureLink {
                armed,
                chunks: chunk_rx,
                dropped,
                sample_rate,
            }),
        })
    }

    pub fn meter(&self) -> MeterReader {
        self.meter.clone()
    }

    /// Hand the capture side to a recorder. Only the first call gets it.
    pub fn take_capture(&mut self) -> Option<CaptureLink> {
        self.capture.take()
    }
}

/// Input-thread end of the capture channel
struct CaptureSink {
    chunks: Sender<Vec<f32>>,
    dropped: Arc<AtomicUsize>,
}

impl CaptureSink {
    /// Never blocks; a full channel counts the chunk as dropped
    fn forward(&self, chunk: Vec<f32>) {
        if self.chunks.try_send(chunk).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut meter: MeterWriter,
    armed: Arc<AtomicBool>,
    capture: CaptureSink,
) -> Result<Stream, StreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = (config.channels as usize).max(1);
    let mut frames = FrameAccumulator::new();

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let now = Instant::now();
            let recording = armed.load(Ordering::Acquire);
            let mut chunk = if recording {
                Vec::with_capacity(data.len() / channels)
            } else {
                Vec::new()
            };

            for frame in data.chunks(channels) {
                // Meter follows the first channel, the recorder gets a mono mix
                let first: f32 = frame[0].to_sample();
                frames.push(first, |f| meter.process(f, now));

                if recording {
                    let sum: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum();
                    chunk.push(sum / frame.len() as f32);
                }
            }

            if !chunk.is_empty() {
                capture.forward(chunk);
            }
        },
        |err| log::error!("input stream error: {}", err),
        None,
    )?;

    Ok(stream)
}
