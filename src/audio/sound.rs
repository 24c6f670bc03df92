use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SoundError;

/// Format tags that [`Sound::decode`] understands
pub const SUPPORTED_FORMATS: &[&str] = &["wav"];

/// A decoded, playable sound. Cloning is cheap and clones share the samples.
#[derive(Clone)]
pub struct Sound {
    inner: Arc<SoundData>,
}

struct SoundData {
    name: String,
    samples: Vec<f32>, // mono
    sample_rate: u32,
}

impl Sound {
    /// Wrap already-decoded mono samples
    pub fn from_samples(
        name: impl Into<String>,
        samples: Vec<f32>,
        sample_rate: u32,
    ) -> Result<Self, SoundError> {
        if samples.is_empty() || sample_rate == 0 {
            return Err(SoundError::Empty);
        }
        Ok(Self {
            inner: Arc::new(SoundData {
                name: name.into(),
                samples,
                sample_rate,
            }),
        })
    }

    /// Decode raw encoded bytes. `format` is the lowercase file extension.
    pub fn decode(name: impl Into<String>, bytes: &[u8], format: &str) -> Result<Self, SoundError> {
        match format {
            "wav" => {
                let (samples, sample_rate) = decode_wav(bytes)?;
                Self::from_samples(name, samples, sample_rate)
            }
            other => Err(SoundError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Read a file from disk and decode it using its extension as the format tag
    pub fn load_file(path: &Path) -> Result<Self, SoundError> {
        let format = format_tag(path).unwrap_or_default();
        if !SUPPORTED_FORMATS.contains(&format.as_str()) {
            return Err(SoundError::UnsupportedFormat(format));
        }
        let bytes = std::fs::read(path)?;
        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self::decode(name, &bytes, &format)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn samples(&self) -> &[f32] {
        &self.inner.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    pub fn len(&self) -> usize {
        self.inner.samples.len()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.len() as f64 / self.sample_rate() as f64)
    }
}

/// Two handles are equal when they refer to the same decoded artifact
impl PartialEq for Sound {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sound")
            .field("name", &self.inner.name)
            .field("len", &self.inner.samples.len())
            .field("sample_rate", &self.inner.sample_rate)
            .finish()
    }
}

/// Lowercase extension of a path, used as the decoder tag
pub fn format_tag(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// Decode WAV bytes into mono f32 samples at the file's own rate
fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32), SoundError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max_val))
                .collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
    };

    // Average interleaved channels down to mono
    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec.sample_rate))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn wav_bytes(channels: u16, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_mono_wav() {
        let bytes = wav_bytes(1, &[16384, -16384, 0]);
        let sound = Sound::decode("kick", &bytes, "wav").unwrap();

        assert_eq!(sound.name(), "kick");
        assert_eq!(sound.sample_rate(), 44_100);
        assert_eq!(sound.samples(), &[0.5, -0.5, 0.0]);
    }

    #[test]
    fn test_decode_stereo_averages_to_mono() {
        let bytes = wav_bytes(2, &[16384, 0, -16384, -16384]);
        let sound = Sound::decode("pad", &bytes, "wav").unwrap();

        assert_eq!(sound.len(), 2);
        assert!((sound.samples()[0] - 0.25).abs() < 1e-6);
        assert!((sound.samples()[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unsupported_format() {
        let result = Sound::decode("song", &[0u8; 16], "mp3");
        assert!(matches!(result, Err(SoundError::UnsupportedFormat(f)) if f == "mp3"));
    }

    #[test]
    fn test_empty_wav_is_rejected() {
        let bytes = wav_bytes(1, &[]);
        assert!(matches!(
            Sound::decode("silence", &bytes, "wav"),
            Err(SoundError::Empty)
        ));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(
            Sound::decode("junk", b"definitely not riff", "wav"),
            Err(SoundError::Wav(_))
        ));
    }

    #[test]
    fn test_format_tag_is_lowercase() {
        assert_eq!(format_tag(Path::new("/tmp/Snare.WAV")), Some("wav".to_string()));
        assert_eq!(format_tag(Path::new("noext")), None);
    }

    #[test]
    fn test_load_file_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Clap.WAV");
        std::fs::write(&path, wav_bytes(1, &[1000, 2000])).unwrap();

        let sound = Sound::load_file(&path).unwrap();
        assert_eq!(sound.name(), "Clap");
        assert_eq!(sound.len(), 2);
    }

    #[test]
    fn test_clones_compare_equal() {
        let a = Sound::from_samples("a", vec![0.1; 4], 48_000).unwrap();
        let b = Sound::from_samples("a", vec![0.1; 4], 48_000).unwrap();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
