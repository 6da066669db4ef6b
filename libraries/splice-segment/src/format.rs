//! The explicit format triple attached to every segment.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentError};
use splice_codec::SampleWidth;

/// Sample width, frame rate and channel count of a PCM buffer.
///
/// Replaces the loose metadata bag of ad-hoc audio parameters: a segment
/// either carries a complete format or cannot be constructed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Bytes per sample
    pub sample_width: SampleWidth,
    /// Frames per second (Hz)
    pub frame_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
}

impl AudioFormat {
    /// Create a format triple, validating every field
    pub fn new(sample_width: SampleWidth, frame_rate: u32, channels: u16) -> Result<Self> {
        if frame_rate == 0 {
            return Err(SegmentError::InvalidFormat(
                "frame rate must be > 0".to_string(),
            ));
        }
        if channels == 0 {
            return Err(SegmentError::InvalidFormat(
                "channel count must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            sample_width,
            frame_rate,
            channels,
        })
    }

    /// Bytes per frame (one sample per channel)
    pub fn frame_width(&self) -> usize {
        self.sample_width.bytes() * self.channels as usize
    }

    /// Largest representable amplitude for this bit depth, `2^(bits-1)`
    pub fn max_possible_amplitude(&self) -> f64 {
        let bits = self.sample_width.bits();
        (1u64 << (bits - 1)) as f64
    }
}
