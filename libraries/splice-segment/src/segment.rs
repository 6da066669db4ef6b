//! The immutable audio segment value type.
//!
//! A segment is raw PCM bytes plus an [`AudioFormat`]. Every transformation
//! spawns a new segment; nothing is ever mutated in place. All time-indexed
//! addressing is in milliseconds and resolves to whole frames.

use splice_codec::{ops, ratecv, RateWeights, SampleWidth};

use crate::error::{Result, SegmentError};
use crate::format::AudioFormat;
use crate::gain::{db_to_float, ratio_to_db};

/// Extra frames a slice may pad with silence before it is treated as a
/// caller bug, in milliseconds
const MISSING_FRAME_TOLERANCE_MS: i64 = 2;

/// Fade floor used for crossfades, effectively silence
const SILENCE_GAIN_DB: f64 = -120.0;

/// An immutable segment of PCM audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSegment {
    data: Vec<u8>,
    format: AudioFormat,
}

/// How many times an overlay is placed onto the host segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayRepeat {
    /// Place the overlay once
    #[default]
    Once,
    /// Place the overlay up to `n` times; zero is a no-op
    Times(u32),
    /// Repeat until the host segment's remaining length is exhausted
    Loop,
}

/// Options for [`AudioSegment::overlay`]
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayOptions {
    /// Where in the host segment the overlay starts, in milliseconds
    pub position_ms: i64,
    /// Looping behavior
    pub repeat: OverlayRepeat,
    /// Gain applied to the host track inside the overlaid region before
    /// mixing, in dB. Zero leaves the host untouched; a large negative value
    /// ducks it entirely.
    pub gain_during_overlay_db: f64,
}

/// Fade window and gain endpoints for [`AudioSegment::fade`].
///
/// Exactly two of `start_ms`, `end_ms` and `duration_ms` must be given; the
/// third is derived.
#[derive(Debug, Clone, Copy, Default)]
pub struct FadeConfig {
    /// Gain at the end of the fade window, in dB
    pub to_gain_db: f64,
    /// Gain at the start of the fade window, in dB
    pub from_gain_db: f64,
    /// Start of the fade window in milliseconds (negative counts from the end)
    pub start_ms: Option<i64>,
    /// End of the fade window in milliseconds (negative counts from the end)
    pub end_ms: Option<i64>,
    /// Length of the fade window in milliseconds
    pub duration_ms: Option<i64>,
}

impl AudioSegment {
    /// Build a segment from raw PCM bytes and an explicit format triple.
    ///
    /// A sample width of 3 is accepted and immediately widened to 4 bytes
    /// (sign-preserving byte padding); the stored segment is always 1, 2 or
    /// 4 bytes per sample. The buffer must hold a whole number of frames.
    pub fn from_raw(
        data: Vec<u8>,
        sample_width: usize,
        frame_rate: u32,
        channels: u16,
    ) -> Result<Self> {
        let (data, sample_width) = if sample_width == 3 {
            (splice_codec::widen_24_to_32(&data)?, 4)
        } else {
            (data, sample_width)
        };
        let width = SampleWidth::from_bytes(sample_width)?;
        let format = AudioFormat::new(width, frame_rate, channels)?;
        Self::from_format(data, format)
    }

    /// Build a segment from raw PCM bytes and a validated format
    pub fn from_format(data: Vec<u8>, format: AudioFormat) -> Result<Self> {
        if data.len() % format.frame_width() != 0 {
            return Err(SegmentError::InvalidFormat(format!(
                "data length {} is not a multiple of the frame width {}",
                data.len(),
                format.frame_width()
            )));
        }
        Ok(Self { data, format })
    }

    /// A zero-length segment
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            format: AudioFormat {
                sample_width: SampleWidth::B1,
                frame_rate: 1,
                channels: 1,
            },
        }
    }

    /// Generate a silent mono 16-bit segment of the given duration
    pub fn silent(duration_ms: i64, frame_rate: u32) -> Result<Self> {
        let format = AudioFormat::new(SampleWidth::B2, frame_rate, 1)?;
        let frames = (f64::from(frame_rate) * (duration_ms as f64 / 1000.0)) as usize;
        Self::from_format(vec![0u8; frames * 2], format)
    }

    /// The raw PCM bytes
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// The format triple
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Bytes per sample
    pub fn sample_width(&self) -> usize {
        self.format.sample_width.bytes()
    }

    /// Frames per second
    pub fn frame_rate(&self) -> u32 {
        self.format.frame_rate
    }

    /// Channel count
    pub fn channels(&self) -> u16 {
        self.format.channels
    }

    /// Bytes per frame
    pub fn frame_width(&self) -> usize {
        self.format.frame_width()
    }

    /// Number of whole frames in the segment
    pub fn frame_count(&self) -> u64 {
        (self.data.len() / self.format.frame_width()) as u64
    }

    /// Fractional number of frames covering `ms` milliseconds at this rate
    pub fn frame_count_at_ms(&self, ms: i64) -> f64 {
        ms as f64 * (f64::from(self.format.frame_rate) / 1000.0)
    }

    /// Segment length in milliseconds, rounded
    pub fn len_ms(&self) -> i64 {
        (1000.0 * self.frame_count() as f64 / f64::from(self.format.frame_rate)).round() as i64
    }

    /// Segment length in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.format.frame_rate)
    }

    /// True if the segment holds no frames
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Spawn a derived segment: new buffer, same format
    fn spawn(&self, data: Vec<u8>) -> Self {
        Self {
            data,
            format: self.format,
        }
    }

    /// Spawn a derived segment with an overridden format
    fn spawn_with(&self, data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// Resolve a millisecond position (negative counts from the end) to a
    /// frame index, truncating
    fn parse_position(&self, ms: i64) -> usize {
        let ms = if ms < 0 { self.len_ms() + ms } else { ms };
        (self.frame_count_at_ms(ms).max(0.0)) as usize
    }

    /// Slice by milliseconds.
    ///
    /// `None` bounds default to the segment's edges; negative bounds count
    /// from the end; out-of-range bounds are clamped. If rounding leaves the
    /// requested range up to 2 ms past the available data, the shortfall is
    /// padded with muted frames; a larger shortfall fails with
    /// [`SegmentError::TooManyMissingFrames`].
    pub fn slice(&self, start_ms: Option<i64>, end_ms: Option<i64>) -> Result<Self> {
        let len = self.len_ms();
        let start = start_ms.unwrap_or(0).min(len);
        let end = end_ms.unwrap_or(len).min(len);

        let frame_width = self.format.frame_width();
        let start_b = self.parse_position(start) * frame_width;
        let end_b = self.parse_position(end) * frame_width;

        let avail = self.data.len();
        let mut data = if start_b < end_b {
            self.data[start_b.min(avail)..end_b.min(avail)].to_vec()
        } else {
            Vec::new()
        };

        // pad the shortfall caused by ms -> frame rounding with silence
        let expected = end_b.saturating_sub(start_b);
        let missing_frames = (expected - data.len()) / frame_width;
        if missing_frames > 0 {
            if missing_frames as f64 > self.frame_count_at_ms(MISSING_FRAME_TOLERANCE_MS) {
                return Err(SegmentError::TooManyMissingFrames {
                    missing: missing_frames as u64,
                });
            }
            if data.len() >= frame_width {
                let silence = ops::mul(&data[..frame_width], self.format.sample_width, 0.0)?;
                for _ in 0..missing_frames {
                    data.extend_from_slice(&silence);
                }
            }
        }

        Ok(self.spawn(data))
    }

    /// Slice by frame index with clamping.
    ///
    /// Negative indices do *not* address frames backward from the end; they
    /// clamp to zero.
    pub fn get_sample_slice(&self, start_frame: Option<i64>, end_frame: Option<i64>) -> Self {
        let max_val = self.frame_count() as i64;
        let bounded = |val: Option<i64>, default: i64| val.unwrap_or(default).clamp(0, max_val);

        let frame_width = self.format.frame_width();
        let start_b = bounded(start_frame, 0) as usize * frame_width;
        let end_b = bounded(end_frame, max_val) as usize * frame_width;

        if start_b < end_b {
            self.spawn(self.data[start_b..end_b].to_vec())
        } else {
            self.spawn(Vec::new())
        }
    }

    /// The raw bytes of a single frame (empty past the end)
    pub fn get_frame(&self, index: usize) -> &[u8] {
        let frame_width = self.format.frame_width();
        let start = (index * frame_width).min(self.data.len());
        let end = (start + frame_width).min(self.data.len());
        &self.data[start..end]
    }

    /// The segment's audio repeated `n` times back to back
    pub fn repeated(&self, n: usize) -> Self {
        self.spawn(self.data.repeat(n))
    }

    /// Unify two segments' formats before a binary operation.
    ///
    /// Channels, then frame rate, then sample width are raised to the
    /// pairwise maximum, in that order: the channel fold and rate conversion
    /// assume they run at the original width.
    pub fn synchronize(a: &Self, b: &Self) -> Result<(Self, Self)> {
        let channels = a.channels().max(b.channels());
        let a = a.set_channels(channels)?;
        let b = b.set_channels(channels)?;

        let frame_rate = a.frame_rate().max(b.frame_rate());
        let a = a.set_frame_rate(frame_rate)?;
        let b = b.set_frame_rate(frame_rate)?;

        let sample_width = a.sample_width().max(b.sample_width());
        let a = a.set_sample_width(sample_width)?;
        let b = b.set_sample_width(sample_width)?;

        Ok((a, b))
    }

    /// Re-quantize to a new sample width.
    ///
    /// 8-bit PCM uses the unsigned encoding convention, so converting from
    /// or to 1 byte biases by -128 / +128 around the width change.
    pub fn set_sample_width(&self, sample_width: usize) -> Result<Self> {
        let target = SampleWidth::from_bytes(sample_width)?;
        if target == self.format.sample_width {
            return Ok(self.clone());
        }

        let mut data = self.data.clone();
        if self.format.sample_width == SampleWidth::B1 {
            data = ops::bias(&data, SampleWidth::B1, -128)?;
        }
        if !data.is_empty() {
            data = ops::lin2lin(&data, self.format.sample_width, target)?;
        }
        if target == SampleWidth::B1 {
            data = ops::bias(&data, SampleWidth::B1, 128)?;
        }

        let format = AudioFormat {
            sample_width: target,
            ..self.format
        };
        Ok(self.spawn_with(data, format))
    }

    /// Resample to a new frame rate (one-shot, no carried state)
    pub fn set_frame_rate(&self, frame_rate: u32) -> Result<Self> {
        if frame_rate == self.format.frame_rate {
            return Ok(self.clone());
        }
        let format = AudioFormat::new(self.format.sample_width, frame_rate, self.format.channels)?;

        let data = if self.data.is_empty() {
            Vec::new()
        } else {
            let (converted, _state) = ratecv(
                &self.data,
                self.format.sample_width,
                self.format.channels as usize,
                self.format.frame_rate,
                frame_rate,
                None,
                RateWeights::default(),
            )?;
            converted
        };
        Ok(self.spawn_with(data, format))
    }

    /// Remix to a new channel count. Only mono <-> stereo is supported.
    pub fn set_channels(&self, channels: u16) -> Result<Self> {
        if channels == self.format.channels {
            return Ok(self.clone());
        }

        let width = self.format.sample_width;
        let data = match (self.format.channels, channels) {
            (1, 2) => ops::tostereo(&self.data, width, 1.0, 1.0)?,
            (2, 1) => ops::tomono(&self.data, width, 0.5, 0.5)?,
            (from, to) => {
                return Err(SegmentError::UnsupportedChannelConversion { from, to });
            }
        };

        let format = AudioFormat {
            channels,
            ..self.format
        };
        Ok(self.spawn_with(data, format))
    }

    /// Split a stereo segment into its left and right channels
    pub fn split_to_mono(&self) -> Result<Vec<Self>> {
        match self.format.channels {
            1 => Ok(vec![self.clone()]),
            2 => {
                let width = self.format.sample_width;
                let left = ops::tomono(&self.data, width, 1.0, 0.0)?;
                let right = ops::tomono(&self.data, width, 0.0, 1.0)?;
                let format = AudioFormat {
                    channels: 1,
                    ..self.format
                };
                Ok(vec![
                    self.spawn_with(left, format),
                    self.spawn_with(right, format),
                ])
            }
            from => Err(SegmentError::UnsupportedChannelConversion { from, to: 1 }),
        }
    }

    /// Root mean square amplitude. 8-bit segments are measured after
    /// widening to 16-bit (the unsigned encoding would skew the result).
    pub fn rms(&self) -> Result<i64> {
        if self.format.sample_width == SampleWidth::B1 {
            return self.set_sample_width(2)?.rms();
        }
        Ok(ops::rms(&self.data, self.format.sample_width)?)
    }

    /// Loudness in dB relative to full scale; `-inf` for digital silence
    pub fn dbfs(&self) -> Result<f64> {
        if self.format.sample_width == SampleWidth::B1 {
            return self.set_sample_width(2)?.dbfs();
        }
        let rms = self.rms()? as f64;
        if rms == 0.0 {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(ratio_to_db(rms / self.format.max_possible_amplitude()))
    }

    /// Peak absolute sample value
    pub fn max(&self) -> Result<i64> {
        Ok(ops::max_abs(&self.data, self.format.sample_width)?)
    }

    /// Largest representable amplitude for this bit depth
    pub fn max_possible_amplitude(&self) -> f64 {
        self.format.max_possible_amplitude()
    }

    /// Peak level in dB relative to full scale
    pub fn max_dbfs(&self) -> Result<f64> {
        Ok(ratio_to_db(
            self.max()? as f64 / self.format.max_possible_amplitude(),
        ))
    }

    /// Multiply the whole segment by a gain in dB
    pub fn apply_gain(&self, gain_db: f64) -> Result<Self> {
        let data = ops::mul(&self.data, self.format.sample_width, db_to_float(gain_db))?;
        Ok(self.spawn(data))
    }

    /// Reverse the audio (byte-exact involution)
    pub fn reverse(&self) -> Result<Self> {
        let data = ops::reverse(&self.data, self.format.sample_width)?;
        Ok(self.spawn(data))
    }

    /// Concatenate `other` after this segment with no crossfade
    pub fn concat(&self, other: &Self) -> Result<Self> {
        self.append(other, 0)
    }

    /// Concatenate with a crossfade: the tail of this segment fades out
    /// while the head of `other` fades in, and the two are summed.
    ///
    /// The result is `len(self) + len(other) - crossfade_ms` long. Fails if
    /// the crossfade exceeds either operand's length.
    pub fn append(&self, other: &Self, crossfade_ms: i64) -> Result<Self> {
        let (seg1, seg2) = Self::synchronize(self, other)?;

        if crossfade_ms == 0 {
            let mut data = seg1.data.clone();
            data.extend_from_slice(&seg2.data);
            return Ok(seg1.spawn(data));
        }
        if crossfade_ms < 0 {
            return Err(SegmentError::InvalidDuration(crossfade_ms));
        }
        if crossfade_ms > seg1.len_ms() || crossfade_ms > seg2.len_ms() {
            return Err(SegmentError::InvalidArgument(
                "crossfade is longer than the original audio segments".to_string(),
            ));
        }

        let len1 = seg1.len_ms();
        let tail = seg1.slice(Some(len1 - crossfade_ms), None)?;
        let tail_len = tail.len_ms();
        let tail = tail.fade(&FadeConfig {
            to_gain_db: SILENCE_GAIN_DB,
            start_ms: Some(0),
            end_ms: Some(tail_len),
            ..FadeConfig::default()
        })?;
        let head = seg2.slice(None, Some(crossfade_ms))?;
        let head_len = head.len_ms();
        let head = head.fade(&FadeConfig {
            from_gain_db: SILENCE_GAIN_DB,
            start_ms: Some(0),
            end_ms: Some(head_len),
            ..FadeConfig::default()
        })?;

        // sum over the shared region; rounding can leave one side a frame
        // longer, and that remainder passes through unmixed
        let shared = tail.data.len().min(head.data.len());
        let width = seg1.format.sample_width;
        let mut crossfaded = ops::add(&tail.data[..shared], &head.data[..shared], width)?;
        crossfaded.extend_from_slice(&tail.data[shared..]);

        let mut data = seg1.slice(None, Some(len1 - crossfade_ms))?.data;
        data.extend_from_slice(&crossfaded);
        data.extend_from_slice(&seg2.slice(Some(crossfade_ms), None)?.data);
        Ok(seg1.spawn(data))
    }

    /// Mix `other` onto this segment by sample-wise addition.
    ///
    /// Placement starts at `position_ms` and repeats per
    /// [`OverlayOptions::repeat`]; the final repetition is truncated to fit,
    /// and placements never extend past the host segment's end.
    pub fn overlay(&self, other: &Self, options: &OverlayOptions) -> Result<Self> {
        let (seg1, seg2) = Self::synchronize(self, other)?;

        let mut times: i64 = match options.repeat {
            OverlayRepeat::Once => 1,
            OverlayRepeat::Times(0) => return Ok(seg1.spawn(seg1.data.clone())),
            OverlayRepeat::Times(n) => i64::from(n),
            OverlayRepeat::Loop => -1,
        };

        let width = seg1.format.sample_width;
        let head = seg1.slice(None, Some(options.position_ms))?;
        let region = seg1.slice(Some(options.position_ms), None)?;

        let mut out = head.data;
        let host = region.data;
        let insert = &seg2.data;
        let mut pos = 0usize;

        while times != 0 {
            let remaining = host.len() - pos;
            if remaining == 0 {
                break;
            }
            let chunk_len = insert.len().min(remaining);
            let last_pass = insert.len() >= remaining;

            let base = &host[pos..pos + chunk_len];
            let mixed = if options.gain_during_overlay_db == 0.0 {
                ops::add(base, &insert[..chunk_len], width)?
            } else {
                let ducked = ops::mul(base, width, db_to_float(options.gain_during_overlay_db))?;
                ops::add(&ducked, &insert[..chunk_len], width)?
            };
            out.extend_from_slice(&mixed);
            pos += chunk_len;

            if last_pass {
                break;
            }
            times -= 1;
        }

        out.extend_from_slice(&host[pos..]);
        Ok(seg1.spawn(out))
    }

    /// Fade the segment's volume across a window.
    ///
    /// Gain is interpolated linearly in amplitude space between
    /// `from_gain_db` and `to_gain_db`. Fades longer than 100 ms step the
    /// gain once per millisecond; shorter fades step once per frame to avoid
    /// audible zipper noise. Outside the window the audio passes through at
    /// the boundary gain.
    pub fn fade(&self, config: &FadeConfig) -> Result<Self> {
        if config.start_ms.is_some() && config.end_ms.is_some() && config.duration_ms.is_some() {
            return Err(SegmentError::InvalidArgument(
                "only two of start, end and duration may be specified".to_string(),
            ));
        }

        // no fade == the same audio
        if config.to_gain_db == 0.0 && config.from_gain_db == 0.0 {
            return Ok(self.clone());
        }

        if let Some(d) = config.duration_ms {
            if d < 0 {
                return Err(SegmentError::InvalidDuration(d));
            }
        }

        let len = self.len_ms();
        let resolve = |ms: i64| {
            let ms = ms.min(len);
            if ms < 0 {
                ms + len
            } else {
                ms
            }
        };
        let start = config.start_ms.map(resolve);
        let end = config.end_ms.map(resolve);

        let (start, end, duration) = match (start, end, config.duration_ms) {
            (Some(s), Some(e), None) => (s, e, e - s),
            (Some(s), None, Some(d)) => (s, s + d, d),
            (None, Some(e), Some(d)) => (e - d, e, d),
            _ => {
                return Err(SegmentError::InvalidArgument(
                    "two of start, end and duration must be specified".to_string(),
                ));
            }
        };
        if duration < 0 {
            return Err(SegmentError::InvalidDuration(duration));
        }

        let width = self.format.sample_width;
        let from_power = db_to_float(config.from_gain_db);
        let gain_delta = db_to_float(config.to_gain_db) - from_power;

        let mut output = Vec::with_capacity(self.data.len());

        // audio before the fade window, at the starting gain
        let before = self.slice(None, Some(start))?.data;
        if config.from_gain_db == 0.0 {
            output.extend_from_slice(&before);
        } else {
            output.extend_from_slice(&ops::mul(&before, width, from_power)?);
        }

        if duration > 100 {
            // coarse fade: one gain step per millisecond
            let scale_step = gain_delta / duration as f64;
            for i in 0..duration {
                let volume_change = from_power + scale_step * i as f64;
                let chunk = self.slice(Some(start + i), Some(start + i + 1))?.data;
                output.extend_from_slice(&ops::mul(&chunk, width, volume_change)?);
            }
        } else {
            // precise fade: one gain step per frame
            let start_frame = self.frame_count_at_ms(start) as i64;
            let end_frame = self.frame_count_at_ms(end) as i64;
            let fade_frames = end_frame - start_frame;
            if fade_frames > 0 {
                let scale_step = gain_delta / fade_frames as f64;
                for i in 0..fade_frames {
                    let volume_change = from_power + scale_step * i as f64;
                    let frame = self.get_frame((start_frame + i) as usize);
                    output.extend_from_slice(&ops::mul(frame, width, volume_change)?);
                }
            }
        }

        // audio after the fade window, at the ending gain
        let after = self.slice(Some(end), None)?.data;
        if config.to_gain_db == 0.0 {
            output.extend_from_slice(&after);
        } else {
            output.extend_from_slice(&ops::mul(&after, width, db_to_float(config.to_gain_db))?);
        }

        Ok(self.spawn(output))
    }

    /// Fade in from silence over the first `duration_ms`
    pub fn fade_in(&self, duration_ms: i64) -> Result<Self> {
        self.fade(&FadeConfig {
            from_gain_db: SILENCE_GAIN_DB,
            start_ms: Some(0),
            duration_ms: Some(duration_ms),
            ..FadeConfig::default()
        })
    }

    /// Fade out to silence over the last `duration_ms`
    pub fn fade_out(&self, duration_ms: i64) -> Result<Self> {
        self.fade(&FadeConfig {
            to_gain_db: SILENCE_GAIN_DB,
            end_ms: Some(self.len_ms()),
            duration_ms: Some(duration_ms),
            ..FadeConfig::default()
        })
    }

    /// Break the segment into consecutive chunks of `chunk_ms` milliseconds
    /// (the last one may be shorter)
    pub fn chunks(&self, chunk_ms: i64) -> Result<Vec<Self>> {
        if chunk_ms <= 0 {
            return Err(SegmentError::InvalidDuration(chunk_ms));
        }
        let len = self.len_ms();
        let count = (len as f64 / chunk_ms as f64).ceil() as i64;
        let mut chunks = Vec::with_capacity(count as usize);
        for i in 0..count {
            chunks.push(self.slice(Some(i * chunk_ms), Some((i + 1) * chunk_ms))?);
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_i16(vals: &[i16]) -> Vec<u8> {
        vals.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn tone(ms: i64, rate: u32, amplitude: i16) -> AudioSegment {
        // square-ish test signal, alternating +/- amplitude
        let frames = (u64::from(rate) * ms as u64 / 1000) as usize;
        let vals: Vec<i16> = (0..frames)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect();
        AudioSegment::from_raw(pack_i16(&vals), 2, rate, 1).unwrap()
    }

    #[test]
    fn construction_from_wav_style_payload() {
        // a single 2-channel 16-bit frame of silence at 32000 Hz
        let seg = AudioSegment::from_raw(vec![0u8; 4], 2, 32_000, 2).unwrap();
        assert_eq!(seg.frame_count(), 1);
        assert_eq!(seg.channels(), 2);
        assert_eq!(seg.sample_width(), 2);
        assert_eq!(seg.frame_rate(), 32_000);
    }

    #[test]
    fn construction_rejects_ragged_buffer() {
        assert!(matches!(
            AudioSegment::from_raw(vec![0u8; 5], 2, 44_100, 2),
            Err(SegmentError::InvalidFormat(_))
        ));
    }

    #[test]
    fn construction_widens_24_bit() {
        let seg = AudioSegment::from_raw(vec![0x01, 0x00, 0x00], 3, 44_100, 1).unwrap();
        assert_eq!(seg.sample_width(), 4);
        assert_eq!(seg.frame_count(), 1);
        assert_eq!(
            splice_codec::get_sample(seg.raw_data(), SampleWidth::B4, 0).unwrap(),
            1
        );
    }

    #[test]
    fn len_is_in_milliseconds() {
        let seg = tone(1000, 8000, 1000);
        assert_eq!(seg.len_ms(), 1000);
        assert_eq!(seg.frame_count(), 8000);
        assert!((seg.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn slice_to_zero_is_empty() {
        let seg = tone(1000, 8000, 1000);
        let sliced = seg.slice(None, Some(0)).unwrap();
        assert_eq!(sliced.len_ms(), 0);
        assert!(sliced.is_empty());
    }

    #[test]
    fn slice_is_bounded_and_idempotent() {
        let seg = tone(1000, 8000, 1000);
        let a = seg.slice(None, Some(200)).unwrap();
        let b = a.slice(None, Some(500)).unwrap();
        assert_eq!(b, a);
        let c = seg.slice(None, Some(500)).unwrap().slice(None, Some(200)).unwrap();
        assert_eq!(c, seg.slice(None, Some(200)).unwrap());
    }

    #[test]
    fn slice_with_negative_bounds() {
        let seg = tone(1000, 8000, 1000);
        let tail = seg.slice(Some(-100), None).unwrap();
        assert_eq!(tail.len_ms(), 100);
    }

    #[test]
    fn slice_clamps_out_of_range() {
        let seg = tone(100, 8000, 1000);
        let all = seg.slice(None, Some(10_000)).unwrap();
        assert_eq!(all, seg.slice(None, None).unwrap());
    }

    #[test]
    fn get_sample_slice_clamps() {
        let seg = tone(100, 8000, 1000);
        let full = seg.get_sample_slice(Some(-5), Some(9999));
        assert_eq!(full.frame_count(), seg.frame_count());
        let part = seg.get_sample_slice(Some(10), Some(20));
        assert_eq!(part.frame_count(), 10);
    }

    #[test]
    fn reverse_twice_is_identity() {
        let seg = tone(100, 8000, 1000);
        assert_eq!(seg.reverse().unwrap().reverse().unwrap(), seg);
    }

    #[test]
    fn concat_adds_lengths() {
        let a = tone(300, 8000, 1000);
        let b = tone(200, 8000, 500);
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.len_ms(), 500);
    }

    #[test]
    fn append_with_crossfade_shortens_by_crossfade() {
        let a = tone(300, 8000, 1000);
        let b = tone(200, 8000, 500);
        let joined = a.append(&b, 50).unwrap();
        assert_eq!(joined.len_ms(), 450);
    }

    #[test]
    fn append_rejects_oversized_crossfade() {
        let a = tone(300, 8000, 1000);
        let b = tone(40, 8000, 500);
        assert!(matches!(
            a.append(&b, 50),
            Err(SegmentError::InvalidArgument(_))
        ));
    }

    #[test]
    fn append_synchronizes_formats() {
        let a = tone(100, 8000, 1000);
        let b = tone(100, 16_000, 1000).set_channels(2).unwrap();
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.frame_rate(), 16_000);
        assert_eq!(joined.channels(), 2);
    }

    #[test]
    fn overlay_times_zero_is_a_noop_copy() {
        let seg = tone(200, 8000, 1000);
        let other = tone(50, 8000, 500);
        let out = seg
            .overlay(
                &other,
                &OverlayOptions {
                    repeat: OverlayRepeat::Times(0),
                    ..OverlayOptions::default()
                },
            )
            .unwrap();
        assert_eq!(out, seg);
    }

    #[test]
    fn overlay_keeps_host_length() {
        let seg = tone(200, 8000, 1000);
        let other = tone(500, 8000, 500);
        let out = seg.overlay(&other, &OverlayOptions::default()).unwrap();
        assert_eq!(out.len_ms(), seg.len_ms());
    }

    #[test]
    fn overlay_mixes_by_addition() {
        let seg = AudioSegment::from_raw(pack_i16(&[100, 100, 100, 100]), 2, 4000, 1).unwrap();
        let other = AudioSegment::from_raw(pack_i16(&[25, 25, 25, 25]), 2, 4000, 1).unwrap();
        let out = seg.overlay(&other, &OverlayOptions::default()).unwrap();
        assert_eq!(out.raw_data(), pack_i16(&[125, 125, 125, 125]));
    }

    #[test]
    fn overlay_loop_fills_host() {
        let seg = AudioSegment::from_raw(pack_i16(&[10; 8]), 2, 4000, 1).unwrap();
        let other = AudioSegment::from_raw(pack_i16(&[5, 5]), 2, 4000, 1).unwrap();
        let out = seg
            .overlay(
                &other,
                &OverlayOptions {
                    repeat: OverlayRepeat::Loop,
                    ..OverlayOptions::default()
                },
            )
            .unwrap();
        assert_eq!(out.raw_data(), pack_i16(&[15; 8]));
    }

    #[test]
    fn overlay_ducking_suppresses_host() {
        let seg = AudioSegment::from_raw(pack_i16(&[1000; 4]), 2, 4000, 1).unwrap();
        let other = AudioSegment::from_raw(pack_i16(&[25; 4]), 2, 4000, 1).unwrap();
        let out = seg
            .overlay(
                &other,
                &OverlayOptions {
                    gain_during_overlay_db: SILENCE_GAIN_DB,
                    ..OverlayOptions::default()
                },
            )
            .unwrap();
        // host fully ducked, only the overlay remains
        assert_eq!(out.raw_data(), pack_i16(&[25; 4]));
    }

    #[test]
    fn apply_gain_of_minus_six_roughly_halves() {
        let seg = AudioSegment::from_raw(pack_i16(&[10_000]), 2, 4000, 1).unwrap();
        let quieter = seg.apply_gain(-6.0).unwrap();
        let val = i16::from_le_bytes([quieter.raw_data()[0], quieter.raw_data()[1]]);
        assert!((i32::from(val) - 5012).abs() <= 1);
    }

    #[test]
    fn fade_rejects_all_three_window_arguments() {
        let seg = tone(500, 8000, 1000);
        let result = seg.fade(&FadeConfig {
            to_gain_db: -6.0,
            start_ms: Some(0),
            end_ms: Some(100),
            duration_ms: Some(100),
            ..FadeConfig::default()
        });
        assert!(matches!(result, Err(SegmentError::InvalidArgument(_))));
    }

    #[test]
    fn fade_rejects_negative_duration() {
        let seg = tone(500, 8000, 1000);
        let result = seg.fade(&FadeConfig {
            to_gain_db: -6.0,
            start_ms: Some(0),
            duration_ms: Some(-5),
            ..FadeConfig::default()
        });
        assert!(matches!(result, Err(SegmentError::InvalidDuration(-5))));
    }

    #[test]
    fn fade_with_zero_gains_is_identity() {
        let seg = tone(500, 8000, 1000);
        let out = seg
            .fade(&FadeConfig {
                start_ms: Some(0),
                end_ms: Some(100),
                ..FadeConfig::default()
            })
            .unwrap();
        assert_eq!(out, seg);
    }

    #[test]
    fn fade_preserves_length() {
        let seg = tone(500, 8000, 1000);
        // long fade: per-ms stepping
        let faded = seg.fade_out(200).unwrap();
        assert_eq!(faded.len_ms(), 500);
        // short fade: per-frame stepping
        let faded = seg.fade_in(50).unwrap();
        assert_eq!(faded.len_ms(), 500);
    }

    #[test]
    fn fade_out_ends_in_silence() {
        let seg = tone(400, 8000, 10_000);
        let faded = seg.fade_out(200).unwrap();
        // only the final millisecond of the ramp reaches near-zero gain
        let tail = faded.slice(Some(-1), None).unwrap();
        assert!(tail.max().unwrap() < 100);
    }

    #[test]
    fn fade_in_starts_in_silence() {
        let seg = tone(400, 8000, 10_000);
        let faded = seg.fade_in(200).unwrap();
        // only the first millisecond of the ramp sits at near-zero gain
        let head = faded.slice(None, Some(1)).unwrap();
        assert!(head.max().unwrap() < 100);
    }

    #[test]
    fn set_channels_round_trip_preserves_rms_for_identical_channels() {
        let mono = tone(100, 8000, 1000);
        let stereo = mono.set_channels(2).unwrap();
        let back = stereo.set_channels(1).unwrap();
        assert_eq!(back.rms().unwrap(), mono.rms().unwrap());
        assert_eq!(back.raw_data(), mono.raw_data());
    }

    #[test]
    fn set_channels_mono_fold_averages() {
        // left 1000, right 500 -> mono 750
        let stereo = AudioSegment::from_raw(pack_i16(&[1000, 500]), 2, 8000, 2).unwrap();
        let mono = stereo.set_channels(1).unwrap();
        assert_eq!(mono.raw_data(), pack_i16(&[750]));
    }

    #[test]
    fn set_channels_rejects_surround() {
        let seg = tone(100, 8000, 1000);
        assert!(matches!(
            seg.set_channels(6),
            Err(SegmentError::UnsupportedChannelConversion { from: 1, to: 6 })
        ));
    }

    #[test]
    fn split_to_mono_separates_channels() {
        let stereo = AudioSegment::from_raw(pack_i16(&[1000, -500, 2000, -700]), 2, 8000, 2).unwrap();
        let channels = stereo.split_to_mono().unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].raw_data(), pack_i16(&[1000, 2000]));
        assert_eq!(channels[1].raw_data(), pack_i16(&[-500, -700]));
    }

    #[test]
    fn set_sample_width_scales_values() {
        let seg = AudioSegment::from_raw(pack_i16(&[1000]), 2, 8000, 1).unwrap();
        let wide = seg.set_sample_width(4).unwrap();
        assert_eq!(wide.sample_width(), 4);
        assert_eq!(
            splice_codec::get_sample(wide.raw_data(), SampleWidth::B4, 0).unwrap(),
            1000 << 8
        );
        let back = wide.set_sample_width(2).unwrap();
        assert_eq!(back.raw_data(), seg.raw_data());
    }

    #[test]
    fn set_sample_width_8bit_uses_unsigned_convention() {
        // unsigned 8-bit midpoint 0x80 is silence
        let seg = AudioSegment::from_raw(vec![0x80, 0x80], 1, 8000, 1).unwrap();
        let wide = seg.set_sample_width(2).unwrap();
        assert_eq!(wide.raw_data(), pack_i16(&[0, 0]));
        let back = wide.set_sample_width(1).unwrap();
        assert_eq!(back.raw_data(), &[0x80, 0x80]);
    }

    #[test]
    fn set_frame_rate_halves_frames() {
        let seg = tone(1000, 8000, 1000);
        let down = seg.set_frame_rate(4000).unwrap();
        assert_eq!(down.frame_rate(), 4000);
        assert_eq!(down.frame_count(), 4000);
        assert_eq!(down.len_ms(), 1000);
    }

    #[test]
    fn sync_raises_to_pairwise_maximum() {
        let a = tone(100, 8000, 1000); // mono, 16-bit, 8 kHz
        let b = AudioSegment::from_raw(vec![0u8; 8], 4, 16_000, 2).unwrap();
        let (a2, b2) = AudioSegment::synchronize(&a, &b).unwrap();
        for seg in [&a2, &b2] {
            assert_eq!(seg.channels(), 2);
            assert_eq!(seg.frame_rate(), 16_000);
            assert_eq!(seg.sample_width(), 4);
        }
    }

    #[test]
    fn silent_generator_is_silent() {
        let seg = AudioSegment::silent(500, 11_025).unwrap();
        assert_eq!(seg.len_ms(), 500);
        assert_eq!(seg.rms().unwrap(), 0);
        assert_eq!(seg.dbfs().unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn repeated_multiplies_length() {
        let seg = tone(100, 8000, 1000);
        assert_eq!(seg.repeated(3).len_ms(), 300);
    }

    #[test]
    fn chunks_cover_segment() {
        let seg = tone(250, 8000, 1000);
        let chunks = seg.chunks(100).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len_ms(), 100);
        assert_eq!(chunks[2].len_ms(), 50);
    }

    #[test]
    fn dbfs_of_full_scale_is_near_zero() {
        let seg = AudioSegment::from_raw(pack_i16(&[i16::MAX, i16::MIN]), 2, 8000, 1).unwrap();
        assert!(seg.max_dbfs().unwrap().abs() < 0.01);
    }
}
