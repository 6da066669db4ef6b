//! Linear-interpolation rate conversion with carried state.
//!
//! Classic accumulator algorithm: the input and output rates are reduced by
//! their GCD, then an accumulator `d` walks the fractional position between
//! input frames. While `d < 0` an input frame is consumed; while `d >= 0` an
//! output frame is emitted as the linear interpolation
//! `(prev * d + cur * (out_rate - d)) / out_rate`.
//!
//! The accumulator and the per-channel `(prev, cur)` sample history are
//! returned as a [`RateState`] so a subsequent call over the next chunk of
//! input continues exactly where the previous one stopped, with no
//! discontinuity at the buffer boundary.

use crate::error::{CodecError, Result};
use crate::sample::{check_params, overflow, put_sample, samples, SampleWidth};

/// Smoothing weights applied to each incoming sample before interpolation.
///
/// The default `(1, 0)` passes samples through unchanged; a nonzero second
/// weight blends in the previous sample as a crude low-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWeights {
    pub a: i64,
    pub b: i64,
}

impl Default for RateWeights {
    fn default() -> Self {
        Self { a: 1, b: 0 }
    }
}

/// Carried resampler state enabling exact continuation across buffer
/// boundaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateState {
    /// Position accumulator, in units of the reduced output rate
    d: i64,
    /// Per-channel `(prev, cur)` input sample history
    channels: Vec<(i64, i64)>,
}

impl RateState {
    fn initial(nchannels: usize, out_rate: i64) -> Self {
        Self {
            d: -out_rate,
            channels: vec![(0, 0); nchannels],
        }
    }
}

/// Resample `buf` from `in_rate` to `out_rate`.
///
/// Pass `state: None` to start a fresh conversion, or the state returned by
/// a previous call to continue a streaming conversion. Returns the converted
/// bytes (trimmed to exactly the frames produced) and the new carried state.
pub fn ratecv(
    buf: &[u8],
    width: SampleWidth,
    nchannels: usize,
    in_rate: u32,
    out_rate: u32,
    state: Option<RateState>,
    weights: RateWeights,
) -> Result<(Vec<u8>, RateState)> {
    check_params(buf.len(), width)?;
    if nchannels < 1 {
        return Err(CodecError::InvalidChannelCount(nchannels));
    }
    if in_rate == 0 {
        return Err(CodecError::InvalidRate(in_rate));
    }
    if out_rate == 0 {
        return Err(CodecError::InvalidRate(out_rate));
    }
    if weights.a < 1 || weights.b < 0 {
        return Err(CodecError::InvalidWeights {
            a: weights.a,
            b: weights.b,
        });
    }

    let bytes_per_frame = width.bytes() * nchannels;
    if buf.len() % bytes_per_frame != 0 {
        return Err(CodecError::NotAWholeNumberOfSamples {
            len: buf.len(),
            width: bytes_per_frame,
        });
    }
    let mut frame_count = buf.len() / bytes_per_frame;

    let g = gcd(i64::from(in_rate), i64::from(out_rate));
    let in_rate = i64::from(in_rate) / g;
    let out_rate = i64::from(out_rate) / g;

    let mut st = match state {
        None => RateState::initial(nchannels, out_rate),
        Some(st) => {
            if st.channels.len() != nchannels {
                return Err(CodecError::InvalidState {
                    state_channels: st.channels.len(),
                    channels: nchannels,
                });
            }
            st
        }
    };

    // upper bound on emitted frames, trimmed on return
    let ceiling = (frame_count as i64 / in_rate + 1) * out_rate;
    let mut out = vec![0u8; ceiling as usize * bytes_per_frame];

    let mut input = samples(buf, width);
    let mut out_i = 0usize;
    loop {
        while st.d < 0 {
            if frame_count == 0 {
                out.truncate(out_i * width.bytes());
                return Ok((out, st));
            }
            for chan in st.channels.iter_mut() {
                let next = input.next().unwrap_or(0);
                chan.0 = chan.1;
                chan.1 = (weights.a * next + weights.b * chan.0) / (weights.a + weights.b);
            }
            frame_count -= 1;
            st.d += out_rate;
        }
        while st.d >= 0 {
            for &(prev, cur) in &st.channels {
                let interp = (i128::from(prev) * i128::from(st.d)
                    + i128::from(cur) * i128::from(out_rate - st.d))
                    / i128::from(out_rate);
                put_sample(&mut out, width, out_i, overflow(interp as i64, width));
                out_i += 1;
            }
            st.d -= in_rate;
        }
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
