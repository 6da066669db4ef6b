//! Fixed-width signed sample encoding and decoding.
//!
//! All buffers are interpreted as sequences of little-endian signed integers
//! of 1, 2 or 4 bytes. 24-bit audio is not representable here; it is widened
//! to 32-bit before it ever reaches this layer.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Width of a single sample in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SampleWidth {
    /// 8-bit samples
    B1,
    /// 16-bit samples
    B2,
    /// 32-bit samples (24-bit audio is widened to this at ingestion)
    B4,
}

impl SampleWidth {
    /// Create from a byte count, rejecting unsupported widths
    pub fn from_bytes(bytes: usize) -> Result<Self> {
        match bytes {
            1 => Ok(Self::B1),
            2 => Ok(Self::B2),
            4 => Ok(Self::B4),
            other => Err(CodecError::InvalidSampleWidth(other)),
        }
    }

    /// Width in bytes
    pub fn bytes(&self) -> usize {
        match self {
            Self::B1 => 1,
            Self::B2 => 2,
            Self::B4 => 4,
        }
    }

    /// Width in bits
    pub fn bits(&self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// Largest representable signed value
    pub fn max_val(&self) -> i64 {
        match self {
            Self::B1 => 0x7f,
            Self::B2 => 0x7fff,
            Self::B4 => 0x7fff_ffff,
        }
    }

    /// Smallest representable signed value
    pub fn min_val(&self) -> i64 {
        match self {
            Self::B1 => -0x80,
            Self::B2 => -0x8000,
            Self::B4 => -0x8000_0000,
        }
    }
}

/// Saturate `val` to the signed range of `width`
pub fn clip(val: i64, width: SampleWidth) -> i64 {
    val.clamp(width.min_val(), width.max_val())
}

/// Two's-complement wraparound of `val` into the signed range of `width`.
///
/// Distinct from [`clip`]: values past the range wrap modularly, matching
/// fixed-width integer arithmetic. Used by bias operations where wraparound
/// is the correct semantic.
pub fn overflow(val: i64, width: SampleWidth) -> i64 {
    if val >= width.min_val() && val <= width.max_val() {
        return val;
    }
    let bits = i64::from(width.bits());
    let offset = 1i64 << (bits - 1);
    (val + offset).rem_euclid(1i64 << bits) - offset
}

/// Check that a buffer holds a whole number of samples
pub fn check_params(len: usize, width: SampleWidth) -> Result<()> {
    if len % width.bytes() != 0 {
        return Err(CodecError::NotAWholeNumberOfSamples {
            len,
            width: width.bytes(),
        });
    }
    Ok(())
}

/// Number of samples in a buffer
pub fn sample_count(buf: &[u8], width: SampleWidth) -> usize {
    buf.len() / width.bytes()
}

/// Decode sample `i` without bounds bookkeeping. Caller guarantees range.
fn get_sample_unchecked(buf: &[u8], width: SampleWidth, i: usize) -> i64 {
    let start = i * width.bytes();
    match width {
        SampleWidth::B1 => i64::from(buf[start] as i8),
        SampleWidth::B2 => i64::from(i16::from_le_bytes([buf[start], buf[start + 1]])),
        SampleWidth::B4 => i64::from(i32::from_le_bytes([
            buf[start],
            buf[start + 1],
            buf[start + 2],
            buf[start + 3],
        ])),
    }
}

/// Decode the `i`-th little-endian signed sample of a buffer
pub fn get_sample(buf: &[u8], width: SampleWidth, i: usize) -> Result<i64> {
    check_params(buf.len(), width)?;
    let count = sample_count(buf, width);
    if i >= count {
        return Err(CodecError::IndexOutOfRange { index: i, count });
    }
    Ok(get_sample_unchecked(buf, width, i))
}

/// Encode `val` as the `i`-th sample of a buffer. `val` must already be in
/// range for `width` (callers clip or overflow first).
pub fn put_sample(buf: &mut [u8], width: SampleWidth, i: usize, val: i64) {
    let start = i * width.bytes();
    match width {
        SampleWidth::B1 => buf[start] = (val as i8) as u8,
        SampleWidth::B2 => buf[start..start + 2].copy_from_slice(&(val as i16).to_le_bytes()),
        SampleWidth::B4 => buf[start..start + 4].copy_from_slice(&(val as i32).to_le_bytes()),
    }
}

/// Iterate all samples of a buffer. The buffer length must already have been
/// validated with [`check_params`].
pub fn samples(buf: &[u8], width: SampleWidth) -> impl Iterator<Item = i64> + '_ {
    (0..sample_count(buf, width)).map(move |i| get_sample_unchecked(buf, width, i))
}

/// Widen packed 24-bit little-endian samples to 32-bit, preserving value and
/// sign via byte padding. Values are not rescaled to the 32-bit range.
pub fn widen_24_to_32(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % 3 != 0 {
        return Err(CodecError::NotAWholeNumberOfSamples {
            len: data.len(),
            width: 3,
        });
    }
    let mut out = Vec::with_capacity(data.len() / 3 * 4);
    for chunk in data.chunks_exact(3) {
        out.extend_from_slice(chunk);
        // sign-extension byte, little-endian so it goes last
        out.push(if chunk[2] & 0x80 != 0 { 0xff } else { 0x00 });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_from_bytes() {
        assert_eq!(SampleWidth::from_bytes(1).unwrap(), SampleWidth::B1);
        assert_eq!(SampleWidth::from_bytes(2).unwrap(), SampleWidth::B2);
        assert_eq!(SampleWidth::from_bytes(4).unwrap(), SampleWidth::B4);
        assert!(matches!(
            SampleWidth::from_bytes(3),
            Err(CodecError::InvalidSampleWidth(3))
        ));
        assert!(SampleWidth::from_bytes(8).is_err());
    }

    #[test]
    fn clip_saturates() {
        assert_eq!(clip(40_000, SampleWidth::B2), 32_767);
        assert_eq!(clip(-40_000, SampleWidth::B2), -32_768);
        assert_eq!(clip(1234, SampleWidth::B2), 1234);
        assert_eq!(clip(200, SampleWidth::B1), 127);
    }

    #[test]
    fn overflow_wraps() {
        // in range: untouched
        assert_eq!(overflow(1000, SampleWidth::B2), 1000);
        // one past the top wraps to the bottom
        assert_eq!(overflow(32_768, SampleWidth::B2), -32_768);
        assert_eq!(overflow(-32_769, SampleWidth::B2), 32_767);
        assert_eq!(overflow(128, SampleWidth::B1), -128);
        assert_eq!(overflow(256, SampleWidth::B1), 0);
    }

    #[test]
    fn get_sample_decodes_little_endian() {
        let buf = [0x01, 0x00, 0xff, 0xff]; // 1, -1 as i16
        assert_eq!(get_sample(&buf, SampleWidth::B2, 0).unwrap(), 1);
        assert_eq!(get_sample(&buf, SampleWidth::B2, 1).unwrap(), -1);
    }

    #[test]
    fn get_sample_out_of_range() {
        let buf = [0u8; 4];
        assert!(matches!(
            get_sample(&buf, SampleWidth::B2, 2),
            Err(CodecError::IndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn get_sample_rejects_ragged_buffer() {
        let buf = [0u8; 3];
        assert!(matches!(
            get_sample(&buf, SampleWidth::B2, 0),
            Err(CodecError::NotAWholeNumberOfSamples { .. })
        ));
    }

    #[test]
    fn put_sample_round_trip() {
        let mut buf = vec![0u8; 8];
        put_sample(&mut buf, SampleWidth::B4, 0, -123_456);
        put_sample(&mut buf, SampleWidth::B4, 1, 7_890_123);
        assert_eq!(get_sample(&buf, SampleWidth::B4, 0).unwrap(), -123_456);
        assert_eq!(get_sample(&buf, SampleWidth::B4, 1).unwrap(), 7_890_123);
    }

    #[test]
    fn widen_24_bit_preserves_value_and_sign() {
        // 0x000001 = 1, 0xffffff = -1 in 24-bit two's complement
        let data = [0x01, 0x00, 0x00, 0xff, 0xff, 0xff];
        let widened = widen_24_to_32(&data).unwrap();
        assert_eq!(widened.len(), 8);
        assert_eq!(get_sample(&widened, SampleWidth::B4, 0).unwrap(), 1);
        assert_eq!(get_sample(&widened, SampleWidth::B4, 1).unwrap(), -1);
    }

    #[test]
    fn widen_24_bit_rejects_ragged_input() {
        assert!(widen_24_to_32(&[0u8; 4]).is_err());
    }
}
