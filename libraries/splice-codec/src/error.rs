/// Codec-specific errors
use thiserror::Error;

/// Result type alias using `CodecError`
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised by the sample codec and buffer algebra primitives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Sample width outside the supported set {1, 2, 4}
    #[error("Invalid sample width: {0} bytes (must be 1, 2 or 4)")]
    InvalidSampleWidth(usize),

    /// Buffer length is not a multiple of the sample width
    #[error("Buffer of {len} bytes is not a whole number of {width}-byte samples")]
    NotAWholeNumberOfSamples { len: usize, width: usize },

    /// Sample index outside the buffer
    #[error("Sample index {index} out of range (buffer holds {count} samples)")]
    IndexOutOfRange { index: usize, count: usize },

    /// Binary operation on buffers of different byte lengths
    #[error("Buffer length mismatch: {left} vs {right} bytes")]
    LengthMismatch { left: usize, right: usize },

    /// Channel count below 1
    #[error("Invalid channel count: {0} (must be >= 1)")]
    InvalidChannelCount(usize),

    /// Sample rate of zero
    #[error("Invalid sample rate: {0} Hz (must be > 0)")]
    InvalidRate(u32),

    /// Carried resampler state does not match the channel count
    #[error("Invalid carried state: holds {state_channels} channels, expected {channels}")]
    InvalidState {
        state_channels: usize,
        channels: usize,
    },

    /// Smoothing weights outside their valid ranges
    #[error("Invalid smoothing weights: a={a}, b={b} (a must be >= 1, b >= 0)")]
    InvalidWeights { a: i64, b: i64 },
}
