//! Splice Codec
//!
//! Sample codec and buffer algebra primitives for the Splice PCM toolkit.
//!
//! This crate provides:
//! - Format-aware decode/encode of fixed-width little-endian signed samples
//! - Bit-depth-specific clipping, biasing and wraparound arithmetic
//! - The buffer algebra engine: mix, gain, bias, reverse, channel fold and
//!   expand, bit-depth conversion, aggregates (rms, max, avg, minmax)
//! - Linear-interpolation rate conversion with carried state for streaming
//!
//! Everything operates on raw byte buffers plus a [`SampleWidth`]; the
//! higher-level segment type lives in `splice-segment`.
//!
//! # Example
//!
//! ```rust
//! use splice_codec::{ops, SampleWidth};
//!
//! // two 16-bit samples: 1000, -2000
//! let buf: Vec<u8> = [1000i16, -2000]
//!     .iter()
//!     .flat_map(|v| v.to_le_bytes())
//!     .collect();
//!
//! let doubled = ops::mul(&buf, SampleWidth::B2, 2.0).unwrap();
//! assert_eq!(ops::max_abs(&doubled, SampleWidth::B2).unwrap(), 4000);
//! ```

mod error;
pub mod ops;
mod ratecv;
mod sample;

pub use error::{CodecError, Result};
pub use ratecv::{ratecv, RateState, RateWeights};
pub use sample::{
    check_params, clip, get_sample, overflow, put_sample, sample_count, samples,
    widen_24_to_32, SampleWidth,
};
