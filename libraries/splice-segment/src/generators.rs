//! Tone generators.
//!
//! A [`SignalGenerator`] produces float amplitudes in `[-1.0, 1.0]` one
//! sample at a time; [`SignalGenerator::to_audio_segment`] renders them
//! into a mono [`AudioSegment`] at the configured rate and bit depth.

use serde::{Deserialize, Serialize};
use splice_codec::{clip, put_sample, SampleWidth};

use crate::error::{Result, SegmentError};
use crate::format::AudioFormat;
use crate::gain::db_to_float;
use crate::segment::AudioSegment;

/// Output format of a generator: sample rate and bit depth (always mono).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Frames per second (Hz)
    pub sample_rate: u32,
    /// Bytes per sample
    pub sample_width: SampleWidth,
}

impl GeneratorConfig {
    /// Default config: 44.1 kHz, 16-bit
    pub fn new() -> Self {
        Self {
            sample_rate: 44_100,
            sample_width: SampleWidth::B2,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A periodic signal that can be rendered into a segment.
pub trait SignalGenerator {
    /// Output rate and bit depth
    fn config(&self) -> GeneratorConfig;

    /// Amplitude of sample `sample_n`, in `[-1.0, 1.0]`
    fn amplitude_at(&self, sample_n: u64) -> f64;

    /// Render `duration_ms` of signal into a mono segment.
    ///
    /// `volume_db` is gain relative to full scale, so `0.0` peaks at the
    /// maximum representable amplitude. Samples past full scale are
    /// clipped.
    fn to_audio_segment(&self, duration_ms: i64, volume_db: f64) -> Result<AudioSegment> {
        if duration_ms < 0 {
            return Err(SegmentError::InvalidDuration(duration_ms));
        }
        let config = self.config();
        let width = config.sample_width;
        let format = AudioFormat::new(width, config.sample_rate, 1)?;

        let frames = (u64::from(config.sample_rate) * duration_ms as u64 / 1000) as usize;
        let max_val = width.max_val() as f64;
        let gain = db_to_float(volume_db);

        let mut data = vec![0u8; frames * width.bytes()];
        for n in 0..frames {
            let mut sample = clip((self.amplitude_at(n as u64) * max_val * gain) as i64, width);
            if width == SampleWidth::B1 {
                // 8-bit segments store unsigned bytes
                sample += 128;
            }
            put_sample(&mut data, width, n, sample);
        }
        AudioSegment::from_format(data, format)
    }
}

/// Sine wave at a fixed frequency.
#[derive(Debug, Clone, Copy)]
pub struct Sine {
    /// Frequency in Hz
    pub freq: f64,
    /// Output rate and bit depth
    pub config: GeneratorConfig,
}

impl Sine {
    /// A sine at `freq` Hz with the default config
    pub fn new(freq: f64) -> Self {
        Self {
            freq,
            config: GeneratorConfig::new(),
        }
    }

    /// A sine at `freq` Hz with an explicit config
    pub fn with_config(freq: f64, config: GeneratorConfig) -> Self {
        Self { freq, config }
    }
}

impl SignalGenerator for Sine {
    fn config(&self) -> GeneratorConfig {
        self.config
    }

    fn amplitude_at(&self, sample_n: u64) -> f64 {
        let step = self.freq * 2.0 * std::f64::consts::PI / f64::from(self.config.sample_rate);
        (step * sample_n as f64).sin()
    }
}
