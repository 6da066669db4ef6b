//! Buffer algebra over packed sample buffers.
//!
//! Every function here is a pure function from byte buffers (plus a sample
//! width) to a fresh output buffer or an aggregate. Arithmetic is done in
//! `i64`, then clipped or wrapped back into the sample range before packing.

use crate::error::{CodecError, Result};
use crate::sample::{
    check_params, clip, overflow, put_sample, sample_count, samples, SampleWidth,
};

/// Multiply every sample by a linear gain factor, clipping to range
pub fn mul(buf: &[u8], width: SampleWidth, factor: f64) -> Result<Vec<u8>> {
    check_params(buf.len(), width)?;
    let mut out = vec![0u8; buf.len()];
    for (i, sample) in samples(buf, width).enumerate() {
        let scaled = clip((sample as f64 * factor) as i64, width);
        put_sample(&mut out, width, i, scaled);
    }
    Ok(out)
}

/// Element-wise sum of two buffers with clipping
pub fn add(buf1: &[u8], buf2: &[u8], width: SampleWidth) -> Result<Vec<u8>> {
    check_params(buf1.len(), width)?;
    if buf1.len() != buf2.len() {
        return Err(CodecError::LengthMismatch {
            left: buf1.len(),
            right: buf2.len(),
        });
    }
    let mut out = vec![0u8; buf1.len()];
    for (i, (s1, s2)) in samples(buf1, width).zip(samples(buf2, width)).enumerate() {
        put_sample(&mut out, width, i, clip(s1 + s2, width));
    }
    Ok(out)
}

/// Add a constant offset to every sample with wraparound.
///
/// Wraparound (not saturation) is what makes this usable for converting
/// between the unsigned and signed 8-bit PCM encodings.
pub fn bias(buf: &[u8], width: SampleWidth, offset: i64) -> Result<Vec<u8>> {
    check_params(buf.len(), width)?;
    let mut out = vec![0u8; buf.len()];
    for (i, sample) in samples(buf, width).enumerate() {
        put_sample(&mut out, width, i, overflow(sample + offset, width));
    }
    Ok(out)
}

/// Reverse the order of samples (not the bytes within a sample)
pub fn reverse(buf: &[u8], width: SampleWidth) -> Result<Vec<u8>> {
    check_params(buf.len(), width)?;
    let count = sample_count(buf, width);
    let mut out = vec![0u8; buf.len()];
    for (i, sample) in samples(buf, width).enumerate() {
        put_sample(&mut out, width, count - i - 1, sample);
    }
    Ok(out)
}

/// Fold an interleaved stereo buffer into mono via a weighted sum per frame
pub fn tomono(buf: &[u8], width: SampleWidth, fac1: f64, fac2: f64) -> Result<Vec<u8>> {
    check_params(buf.len(), width)?;
    let mut out = vec![0u8; buf.len() / 2];
    let mut frame = [0i64; 2];
    for (i, sample) in samples(buf, width).enumerate() {
        frame[i % 2] = sample;
        if i % 2 == 1 {
            let mixed = frame[0] as f64 * fac1 + frame[1] as f64 * fac2;
            put_sample(&mut out, width, i / 2, clip(mixed as i64, width));
        }
    }
    Ok(out)
}

/// Expand a mono buffer into interleaved stereo, scaling each channel
pub fn tostereo(buf: &[u8], width: SampleWidth, fac1: f64, fac2: f64) -> Result<Vec<u8>> {
    check_params(buf.len(), width)?;
    let mut out = vec![0u8; buf.len() * 2];
    for (i, sample) in samples(buf, width).enumerate() {
        put_sample(&mut out, width, i * 2, clip((sample as f64 * fac1) as i64, width));
        put_sample(
            &mut out,
            width,
            i * 2 + 1,
            clip((sample as f64 * fac2) as i64, width),
        );
    }
    Ok(out)
}

/// Re-quantize every sample from one width to another.
///
/// Widening left-shifts toward the larger range, narrowing right-shifts and
/// truncates precision, each followed by a wraparound correction. A no-op
/// when the widths are equal.
pub fn lin2lin(buf: &[u8], src: SampleWidth, dst: SampleWidth) -> Result<Vec<u8>> {
    check_params(buf.len(), src)?;
    if src == dst {
        return Ok(buf.to_vec());
    }
    let count = sample_count(buf, src);
    let mut out = vec![0u8; count * dst.bytes()];
    for (i, sample) in samples(buf, src).enumerate() {
        let shifted = if src.bytes() < dst.bytes() {
            sample << (4 * dst.bytes() / src.bytes())
        } else {
            sample >> (4 * src.bytes() / dst.bytes())
        };
        put_sample(&mut out, dst, i, overflow(shifted, dst));
    }
    Ok(out)
}

/// Root mean square over all samples, truncated to an integer.
/// Zero for an empty buffer.
pub fn rms(buf: &[u8], width: SampleWidth) -> Result<i64> {
    check_params(buf.len(), width)?;
    let count = sample_count(buf, width);
    if count == 0 {
        return Ok(0);
    }
    let sum_squares: f64 = samples(buf, width)
        .map(|s| {
            let s = s as f64;
            s * s
        })
        .sum();
    Ok((sum_squares / count as f64).sqrt() as i64)
}

/// Maximum absolute sample value. Zero for an empty buffer.
pub fn max_abs(buf: &[u8], width: SampleWidth) -> Result<i64> {
    check_params(buf.len(), width)?;
    Ok(samples(buf, width).map(i64::abs).max().unwrap_or(0))
}

/// Smallest and largest sample values. `(0, 0)` for an empty buffer.
pub fn minmax(buf: &[u8], width: SampleWidth) -> Result<(i64, i64)> {
    check_params(buf.len(), width)?;
    let mut min_sample = 0i64;
    let mut max_sample = 0i64;
    for sample in samples(buf, width) {
        min_sample = min_sample.min(sample);
        max_sample = max_sample.max(sample);
    }
    Ok((min_sample, max_sample))
}

/// Arithmetic mean of all samples. Zero for an empty buffer.
pub fn avg(buf: &[u8], width: SampleWidth) -> Result<f64> {
    check_params(buf.len(), width)?;
    let count = sample_count(buf, width);
    if count == 0 {
        return Ok(0.0);
    }
    let sum: i64 = samples(buf, width).sum();
    Ok(sum as f64 / count as f64)
}

/// Number of zero crossings in the buffer
pub fn cross(buf: &[u8], width: SampleWidth) -> Result<usize> {
    check_params(buf.len(), width)?;
    let mut crossings = 0;
    let mut last_sample = 0i64;
    for sample in samples(buf, width) {
        if (sample <= 0 && last_sample > 0) || (sample >= 0 && last_sample < 0) {
            crossings += 1;
        }
        last_sample = sample;
    }
    Ok(crossings)
}
