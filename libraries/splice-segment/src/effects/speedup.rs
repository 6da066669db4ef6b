use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentError};
use crate::segment::AudioSegment;

/// Chunking parameters for [`speedup`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedupSettings {
    /// Length of audio kept per splice, in milliseconds. 150 ms holds at
    /// least one full waveform down to 20 Hz.
    pub chunk_ms: i64,
    /// Crossfade between spliced chunks, in milliseconds
    pub crossfade_ms: i64,
}

impl Default for SpeedupSettings {
    fn default() -> Self {
        Self {
            chunk_ms: 150,
            crossfade_ms: 25,
        }
    }
}

/// Speed playback up by removing a slice of audio from the end of each
/// chunk and re-stitching the remainder with crossfaded appends.
///
/// `playback_speed` must exceed 1.0. Fails with
/// [`SegmentError::TooShort`] when the segment yields fewer than two
/// chunks at the requested settings.
pub fn speedup(
    segment: &AudioSegment,
    playback_speed: f64,
    settings: &SpeedupSettings,
) -> Result<AudioSegment> {
    if playback_speed <= 1.0 || playback_speed.is_nan() {
        return Err(SegmentError::InvalidArgument(format!(
            "playback speed must be greater than 1.0, got {playback_speed}"
        )));
    }
    if settings.chunk_ms <= 0 {
        return Err(SegmentError::InvalidDuration(settings.chunk_ms));
    }

    // fraction of audio to keep; at 1.25x we keep 0.8 and discard 0.2
    let keep_fraction = 1.0 / playback_speed;
    let (chunk_ms, mut ms_to_remove) = if playback_speed < 2.0 {
        // discarding less than half: keep full chunks
        let remove =
            (settings.chunk_ms as f64 * (1.0 - keep_fraction) / keep_fraction) as i64;
        (settings.chunk_ms, remove)
    } else {
        // discarding more than half: discard full chunks
        let keep = (keep_fraction * settings.chunk_ms as f64 / (1.0 - keep_fraction)) as i64;
        (keep, settings.chunk_ms)
    };
    if ms_to_remove < 1 {
        return Err(SegmentError::InvalidArgument(format!(
            "playback speed {playback_speed} removes no audio at {}ms chunks",
            settings.chunk_ms
        )));
    }

    // the crossfade cannot outlast the audio being removed
    let crossfade = settings.crossfade_ms.clamp(0, ms_to_remove - 1);

    let chunks = segment.chunks(chunk_ms + ms_to_remove)?;
    if chunks.len() < 2 {
        return Err(SegmentError::TooShort(format!(
            "{:.2}s segment yields fewer than two {}ms chunks at {:.1}x",
            segment.duration_seconds(),
            chunk_ms,
            playback_speed
        )));
    }

    // truncate a bit less than calculated; the crossfades eat the rest
    ms_to_remove -= crossfade;

    // the last chunk is not guaranteed to be full length, leave it whole
    let last_chunk = chunks[chunks.len() - 1].clone();
    let mut trimmed = Vec::with_capacity(chunks.len() - 1);
    for chunk in &chunks[..chunks.len() - 1] {
        trimmed.push(chunk.slice(None, Some(chunk.len_ms() - ms_to_remove))?);
    }

    let mut out = trimmed[0].clone();
    for chunk in &trimmed[1..] {
        out = out.append(chunk, crossfade)?;
    }
    out.append(&last_chunk, crossfade.min(last_chunk.len_ms()))
}
