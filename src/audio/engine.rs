use std::sync::Arc;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use parking_lot::RwLock;

use super::voice::VoiceBank;
use crate::command::{Command, CommandReceiver};

/// Voice activity published by the audio thread for the grid display
#[derive(Clone, Debug, Default)]
pub struct PlaybackState {
    pub active: Vec<bool>,
    pub previewing: bool,
}

impl PlaybackState {
    pub fn new(cells: usize) -> Self {
        Self {
            active: vec![false; cells],
            previewing: false,
        }
    }

    pub fn is_playing(&self, cell: usize) -> bool {
        self.active.get(cell).copied().unwrap_or(false)
    }
}

/// Output stream that plays cell sounds
pub struct AudioEngine {
    _stream: Stream,
    pub state: Arc<RwLock<PlaybackState>>,
}

impl AudioEngine {
    /// Open the default output device with one voice slot per cell
    pub fn new(cells: usize, command_rx: CommandReceiver) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No output device available")?;

        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0;
        let state = Arc::new(RwLock::new(PlaybackState::new(cells)));

        let stream = match config.sample_format() {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config.into(), cells, command_rx, state.clone())?
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config.into(), cells, command_rx, state.clone())?
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config.into(), cells, command_rx, state.clone())?
            }
            format => anyhow::bail!("Unsupported sample format: {:?}", format),
        };

        stream.play().context("Failed to start output stream")?;
        log::info!("output stream running at {} Hz", sample_rate);

        Ok(Self {
            _stream: stream,
            state,
        })
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        cells: usize,
        command_rx: CommandReceiver,
        state: Arc<RwLock<PlaybackState>>,
    ) -> Result<Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;

        let mut voices = VoiceBank::new(cells, sample_rate);
        let mut local = PlaybackState::new(cells);

        // For periodic state sync
        let mut sync_counter = 0usize;
        let sync_interval = (sample_rate / 60) as usize; // ~60 times per second

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Process commands from the command bus
                while let Some(cmd) = command_rx.try_recv() {
                    match cmd {
                        Command::Trigger { cell, sound, mode } => {
                            voices.trigger(cell, sound, mode);
                        }
                        Command::Stop(cell) => voices.stop(cell),
                        Command::Preview(sound) => voices.preview(sound),
                        Command::StopAll => voices.stop_all(),
                    }
                }

                for frame in data.chunks_mut(channels) {
                    let sample = T::from_sample(soft_clip(voices.next_sample()));
                    for out in frame.iter_mut() {
                        *out = sample;
                    }

                    // Periodic state sync (for the grid to show playing cells)
                    sync_counter += 1;
                    if sync_counter >= sync_interval {
                        sync_counter = 0;
                        voices.active_mask(&mut local.active);
                        local.previewing = voices.is_previewing();
                        if let Some(mut shared) = state.try_write() {
                            shared.active.copy_from_slice(&local.active);
                            shared.previewing = local.previewing;
                        }
                    }
                }
            },
            |err| log::error!("output stream error: {}", err),
            None,
        )?;

        Ok(stream)
    }
}

/// Soft clipping using tanh-like curve
fn soft_clip(x: f32) -> f32 {
    if x.abs() < 0.5 {
        x
    } else {
        x.signum() * (1.0 - (-2.0 * (x.abs() - 0.5)).exp() * 0.5)
    }
}
