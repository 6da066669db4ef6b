//! Silence detection over audio segments.
//!
//! A window of `min_silence_ms` slides across the segment in steps of
//! `seek_step_ms`; windows whose RMS falls at or below the threshold are
//! merged into silent intervals. Window RMS is O(1) per position via a
//! bounded prefix buffer of cumulative per-frame mean squared normalized
//! sample values, so long inputs never materialize per-window slices.

use serde::{Deserialize, Serialize};
use splice_codec::get_sample;
use tracing::{debug, trace};

use crate::error::{Result, SegmentError};
use crate::gain::db_to_float;
use crate::segment::AudioSegment;

/// A half-open `[start_ms, end_ms)` interval
pub type MsInterval = (i64, i64);

/// Tuning for the silence detector
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SilenceParams {
    /// Minimum length of a silent stretch, in milliseconds
    pub min_silence_ms: i64,
    /// RMS level at or below which a window counts as silent, in dBFS
    pub silence_thresh_db: f64,
    /// Step between successive window positions, in milliseconds
    pub seek_step_ms: i64,
    /// Memory budget for the prefix buffer, in KiB
    pub max_buffer_size_kb: u64,
}

impl Default for SilenceParams {
    fn default() -> Self {
        Self {
            min_silence_ms: 1000,
            silence_thresh_db: -16.0,
            seek_step_ms: 1,
            max_buffer_size_kb: 102_400,
        }
    }
}

impl SilenceParams {
    pub fn validate(&self) -> Result<()> {
        if self.min_silence_ms <= 0 {
            return Err(SegmentError::InvalidDuration(self.min_silence_ms));
        }
        if self.seek_step_ms <= 0 {
            return Err(SegmentError::InvalidArgument(
                "seek step must be a positive number of milliseconds".to_string(),
            ));
        }
        Ok(())
    }
}

/// How much detected silence `split_on_silence` keeps around each chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeepSilence {
    /// Keep all surrounding silence
    All,
    /// Strip silence entirely
    None,
    /// Keep up to this many milliseconds on each side
    Ms(i64),
}

impl Default for KeepSilence {
    fn default() -> Self {
        Self::Ms(100)
    }
}

/// Prefix sums of each frame's mean squared normalized sample value over
/// a bounded range of frames. `prefix[k]` covers frames
/// `buf_start..buf_start + k`, so a window RMS is one subtraction, one
/// division and a square root.
struct WindowRms<'a> {
    segment: &'a AudioSegment,
    total_frames: usize,
    /// Most frames the buffer may cover at once (budget minus the leading
    /// zero slot)
    max_covered: usize,
    buf_start: usize,
    prefix: Vec<f64>,
}

impl<'a> WindowRms<'a> {
    fn new(segment: &'a AudioSegment, window_frames: usize, params: &SilenceParams) -> Result<Self> {
        let slots = (params.max_buffer_size_kb as usize)
            .saturating_mul(1024)
            / std::mem::size_of::<f64>();
        if slots < window_frames + 1 {
            return Err(SegmentError::BufferTooSmall {
                required_kb: (((window_frames + 1) * std::mem::size_of::<f64>()) as u64)
                    .div_ceil(1024),
                min_silence_ms: params.min_silence_ms,
            });
        }
        let mut rms = Self {
            segment,
            total_frames: segment.frame_count() as usize,
            max_covered: slots - 1,
            buf_start: 0,
            prefix: Vec::with_capacity((slots).min(segment.frame_count() as usize + 1)),
        };
        rms.refill(0)?;
        Ok(rms)
    }

    /// Rebuild the buffer so it covers frames starting at `from`
    fn refill(&mut self, from: usize) -> Result<()> {
        let covered = self.max_covered.min(self.total_frames - from);
        trace!(from, covered, "refilling silence-scan prefix buffer");

        let width = self.segment.format().sample_width;
        let channels = usize::from(self.segment.channels());
        let max_amplitude = self.segment.max_possible_amplitude();
        let data = self.segment.raw_data();

        self.buf_start = from;
        self.prefix.clear();
        self.prefix.push(0.0);
        let mut acc = 0.0;
        for frame in from..from + covered {
            // square each channel before averaging; a channel mean taken
            // first would cancel anti-correlated channels to zero
            let mut energy = 0.0;
            for ch in 0..channels {
                let sample = get_sample(data, width, frame * channels + ch)? as f64 / max_amplitude;
                energy += sample * sample;
            }
            acc += energy / channels as f64;
            self.prefix.push(acc);
        }
        Ok(())
    }

    /// Normalized RMS of frames `start..end`
    fn window_rms(&mut self, start: usize, end: usize) -> Result<f64> {
        if start < self.buf_start || end > self.buf_start + self.prefix.len() - 1 {
            self.refill(start)?;
        }
        // ms -> frame truncation can make a window one frame longer than
        // the nominal window size; clamp to what is buffered
        let end = end.min(self.buf_start + self.prefix.len() - 1);
        if end <= start {
            return Ok(0.0);
        }
        let sum = self.prefix[end - self.buf_start] - self.prefix[start - self.buf_start];
        Ok((sum.max(0.0) / (end - start) as f64).sqrt())
    }
}

/// Find stretches of at least `min_silence_ms` whose RMS stays at or below
/// the threshold. Returned intervals are sorted, non-overlapping and
/// ascending; runs of silent windows merge, as do runs separated by a gap
/// shorter than `min_silence_ms`.
pub fn detect_silence(segment: &AudioSegment, params: &SilenceParams) -> Result<Vec<MsInterval>> {
    params.validate()?;

    let seg_len = segment.len_ms();
    if seg_len < params.min_silence_ms {
        return Ok(Vec::new());
    }

    let threshold = db_to_float(params.silence_thresh_db);
    let total_frames = segment.frame_count() as usize;
    // ceiling: frame truncation can make a window one frame longer than
    // the nominal size, and the budget must cover that frame too
    let window_frames = (segment.frame_count_at_ms(params.min_silence_ms).ceil() as usize).max(1);
    let mut window = WindowRms::new(segment, window_frames, params)?;

    // window start positions, stepped, with the final position always
    // scanned even when it falls off the step grid
    let last_start = seg_len - params.min_silence_ms;
    let mut starts: Vec<i64> = (0..=last_start).step_by(params.seek_step_ms as usize).collect();
    if last_start % params.seek_step_ms != 0 {
        starts.push(last_start);
    }
    debug!(
        seg_len_ms = seg_len,
        windows = starts.len(),
        threshold,
        "scanning for silence"
    );

    let mut silent_starts = Vec::new();
    for &start_ms in &starts {
        let start_frame = segment.frame_count_at_ms(start_ms) as usize;
        let end_frame =
            (segment.frame_count_at_ms(start_ms + params.min_silence_ms) as usize).min(total_frames);
        if window.window_rms(start_frame, end_frame)? <= threshold {
            silent_starts.push(start_ms);
        }
    }

    // merge silent window positions into intervals
    let mut ranges = Vec::new();
    let mut iter = silent_starts.into_iter();
    let Some(first) = iter.next() else {
        return Ok(ranges);
    };
    let mut range_start = first;
    let mut prev = first;
    for start in iter {
        let continuous = start == prev + params.seek_step_ms;
        let has_gap = start > prev + params.min_silence_ms;
        if !continuous && has_gap {
            ranges.push((range_start, prev + params.min_silence_ms));
            range_start = start;
        }
        prev = start;
    }
    ranges.push((range_start, prev + params.min_silence_ms));

    for &(start, end) in &ranges {
        trace!(start, end, "silent interval");
    }
    Ok(ranges)
}

/// The complement of [`detect_silence`] within `[0, len)`
pub fn detect_nonsilent(segment: &AudioSegment, params: &SilenceParams) -> Result<Vec<MsInterval>> {
    let silent = detect_silence(segment, params)?;
    let seg_len = segment.len_ms();

    if silent.is_empty() {
        return Ok(vec![(0, seg_len)]);
    }
    if silent[0] == (0, seg_len) {
        return Ok(Vec::new());
    }

    let mut nonsilent = Vec::new();
    let mut prev_end = 0;
    for &(start, end) in &silent {
        nonsilent.push((prev_end, start));
        prev_end = end;
    }
    if prev_end != seg_len {
        nonsilent.push((prev_end, seg_len));
    }
    if nonsilent.first() == Some(&(0, 0)) {
        nonsilent.remove(0);
    }
    Ok(nonsilent)
}

/// Cut the segment at its silent stretches, returning the non-silent chunks.
///
/// Each chunk is expanded by the kept silence on both sides; when two
/// expanded chunks would overlap, the overlap is split at its midpoint so
/// no audio is duplicated.
pub fn split_on_silence(
    segment: &AudioSegment,
    params: &SilenceParams,
    keep_silence: KeepSilence,
) -> Result<Vec<AudioSegment>> {
    let keep_ms = match keep_silence {
        KeepSilence::All => segment.len_ms(),
        KeepSilence::None => 0,
        KeepSilence::Ms(ms) => ms,
    };

    let mut ranges: Vec<(i64, i64)> = detect_nonsilent(segment, params)?
        .into_iter()
        .map(|(start, end)| (start - keep_ms, end + keep_ms))
        .collect();

    for i in 1..ranges.len() {
        let last_end = ranges[i - 1].1;
        let next_start = ranges[i].0;
        if next_start < last_end {
            let midpoint = (last_end + next_start) / 2;
            ranges[i - 1].1 = midpoint;
            ranges[i].0 = midpoint;
        }
    }

    let seg_len = segment.len_ms();
    ranges
        .into_iter()
        .map(|(start, end)| segment.slice(Some(start.max(0)), Some(end.min(seg_len))))
        .collect()
}

/// Milliseconds of silence at the head of the segment, measured in chunks of
/// `chunk_ms`
pub fn detect_leading_silence(
    segment: &AudioSegment,
    silence_threshold_db: f64,
    chunk_ms: i64,
) -> Result<i64> {
    if chunk_ms <= 0 {
        return Err(SegmentError::InvalidDuration(chunk_ms));
    }
    let seg_len = segment.len_ms();
    let mut trim_ms = 0;
    while trim_ms < seg_len {
        let chunk = segment.slice(Some(trim_ms), Some(trim_ms + chunk_ms))?;
        if chunk.dbfs()? >= silence_threshold_db {
            break;
        }
        trim_ms += chunk_ms;
    }
    Ok(trim_ms.min(seg_len))
}
