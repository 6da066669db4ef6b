//! Splice Segment
//!
//! The immutable [`AudioSegment`] value type and everything layered on it:
//! millisecond slicing, format synchronization, concatenation, crossfaded
//! appends, overlay mixing, fades and gain, dB/RMS/peak analysis, the
//! silence detector and the effects layer.
//!
//! Segments are values: every operation returns a new segment and the
//! operands are untouched, so they can be shared freely across threads.
//! Compressed formats are out of scope; the [`Transcoder`] trait marks the
//! boundary where an external tool hands PCM in and takes PCM out.
//!
//! # Example
//!
//! ```rust
//! use splice_segment::AudioSegment;
//!
//! // one second of silence, mono 16-bit at 8 kHz
//! let silence = AudioSegment::silent(1000, 8000)?;
//! let beep = AudioSegment::from_raw(
//!     [8000i16, -8000].repeat(2000).iter().flat_map(|v| v.to_le_bytes()).collect(),
//!     2,
//!     8000,
//!     1,
//! )?;
//!
//! let track = silence.append(&beep, 50)?.fade_out(100)?;
//! assert_eq!(track.len_ms(), 1450);
//! # Ok::<(), splice_segment::SegmentError>(())
//! ```

pub mod effects;
mod error;
mod format;
mod gain;
pub mod generators;
mod segment;
pub mod silence;
mod transcode;

pub use error::{Result, SegmentError};
pub use format::AudioFormat;
pub use gain::{db_to_float, ratio_to_db, ratio_to_db_with_reference};
pub use generators::{GeneratorConfig, SignalGenerator, Sine};
pub use segment::{AudioSegment, FadeConfig, OverlayOptions, OverlayRepeat};
pub use transcode::{DecodedAudio, EncodeParams, TranscodeError, Transcoder};
