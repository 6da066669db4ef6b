//! Interface to the external transcoding collaborator.
//!
//! Compressed container formats (mp3, ogg, mp4, ...) are decoded and encoded
//! by an external tool outside this crate's scope. The core only defines the
//! boundary: interleaved little-endian fixed-width signed PCM plus an
//! explicit format triple.

use thiserror::Error;

use crate::error::Result;
use crate::segment::AudioSegment;

/// Errors from the external transcoder
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// Decoding to PCM failed
    #[error("Couldn't decode input: {0}")]
    CouldntDecode(String),

    /// Encoding from PCM failed
    #[error("Couldn't encode output: {0}")]
    CouldntEncode(String),
}

/// PCM bytes plus the format triple reported by a decoder
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved little-endian signed PCM
    pub data: Vec<u8>,
    /// Bytes per sample as reported by the decoder (3 is accepted here and
    /// widened to 4 during segment construction)
    pub sample_width: usize,
    /// Frames per second
    pub frame_rate: u32,
    /// Channel count
    pub channels: u16,
}

impl DecodedAudio {
    /// Build a segment from this decoder output
    pub fn into_segment(self) -> Result<AudioSegment> {
        AudioSegment::from_raw(self.data, self.sample_width, self.frame_rate, self.channels)
    }
}

/// Encoder knobs passed through to the external tool
#[derive(Debug, Clone, Default)]
pub struct EncodeParams {
    /// Codec to force, if any (e.g. "libvorbis")
    pub codec: Option<String>,
    /// Target bitrate (e.g. "128k")
    pub bitrate: Option<String>,
    /// Additional tool-specific arguments
    pub extra_args: Vec<String>,
}

/// The external transcoding collaborator.
///
/// Implementations shell out to an encoder/decoder; none is shipped here.
pub trait Transcoder {
    /// Decode compressed bytes into PCM plus a format triple
    fn decode_to_pcm(
        &self,
        input: &[u8],
        format_hint: Option<&str>,
    ) -> std::result::Result<DecodedAudio, TranscodeError>;

    /// Encode a segment's PCM into the target container format
    fn encode_from_pcm(
        &self,
        segment: &AudioSegment,
        target_format: &str,
        params: &EncodeParams,
    ) -> std::result::Result<Vec<u8>, TranscodeError>;
}
