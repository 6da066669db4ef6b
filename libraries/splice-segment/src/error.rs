/// Segment-specific errors
use thiserror::Error;

use crate::transcode::TranscodeError;
use splice_codec::CodecError;

/// Result type alias using `SegmentError`
pub type Result<T> = std::result::Result<T, SegmentError>;

/// Errors raised by segment operations, the silence detector and effects
#[derive(Error, Debug)]
pub enum SegmentError {
    /// Error bubbled up from the buffer algebra layer
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Error from the external transcoding collaborator
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// Malformed raw buffer or incomplete format on construction
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Slice padding would exceed the 2 ms tolerance. Signals an indexing
    /// bug in the caller, not a legitimate out-of-range request.
    #[error("Refusing to fill more than 2 ms with silence ({missing} frames missing)")]
    TooManyMissingFrames { missing: u64 },

    /// Conflicting or incomplete arguments (e.g. the fade start/end/duration
    /// triple, or a crossfade longer than an operand)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Negative duration
    #[error("Invalid duration: {0} ms (must be non-negative)")]
    InvalidDuration(i64),

    /// Channel conversions other than mono <-> stereo are unsupported
    #[error("Unsupported channel conversion: {from} -> {to} channels")]
    UnsupportedChannelConversion { from: u16, to: u16 },

    /// Silence-detector memory budget below one window's worth of data
    #[error(
        "Silence detector buffer too small: need at least {required_kb} KiB \
         for a {min_silence_ms} ms window"
    )]
    BufferTooSmall {
        required_kb: u64,
        min_silence_ms: i64,
    },

    /// Segment too short for the requested operation
    #[error("Segment too short: {0}")]
    TooShort(String),
}
