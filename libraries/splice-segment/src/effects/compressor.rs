//! Dynamic-range compression.
//!
//! A per-frame envelope follower measures the RMS of the window of
//! `attack_ms` ending at each frame and ramps an attenuation toward
//! `(1 - 1/ratio) * dB-over-threshold` while the level stays above the
//! threshold, releasing back toward zero below it. The attenuation is
//! clamped to `[0, target]` every frame and applied as negative gain.

use serde::{Deserialize, Serialize};
use splice_codec::{get_sample, ops};

use crate::error::Result;
use crate::gain::{db_to_float, ratio_to_db};
use crate::segment::AudioSegment;

/// Compressor settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompressorSettings {
    /// Threshold in dBFS (-60 to 0); levels above it are compressed
    pub threshold_db: f64,

    /// Compression ratio (1.0 to 20.0), e.g. 4.0 means 4:1
    pub ratio: f64,

    /// Attack time in milliseconds (0.1 to 100); also the RMS window length
    pub attack_ms: f64,

    /// Release time in milliseconds (10 to 1000)
    pub release_ms: f64,
}

impl CompressorSettings {
    /// Default settings: -20 dBFS threshold, 4:1, 5 ms attack, 50 ms release
    pub fn new() -> Self {
        Self {
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 5.0,
            release_ms: 50.0,
        }
    }

    /// Gentle compression (vocals, acoustic material)
    pub fn gentle() -> Self {
        Self {
            threshold_db: -15.0,
            ratio: 2.5,
            attack_ms: 10.0,
            release_ms: 100.0,
        }
    }

    /// Aggressive compression (limiting)
    pub fn aggressive() -> Self {
        Self {
            threshold_db: -12.0,
            ratio: 10.0,
            attack_ms: 1.0,
            release_ms: 30.0,
        }
    }

    /// Clamp all settings to safe ranges
    pub fn validate(&mut self) {
        self.threshold_db = self.threshold_db.clamp(-60.0, 0.0);
        self.ratio = self.ratio.clamp(1.0, 20.0);
        self.attack_ms = self.attack_ms.clamp(0.1, 100.0);
        self.release_ms = self.release_ms.clamp(10.0, 1000.0);
    }
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Compress the segment's dynamic range.
///
/// Settings are clamped to their documented ranges before use.
pub fn compress_dynamic_range(
    segment: &AudioSegment,
    settings: &CompressorSettings,
) -> Result<AudioSegment> {
    let mut settings = *settings;
    settings.validate();

    let frame_count = segment.frame_count() as usize;
    if frame_count == 0 {
        return Ok(segment.clone());
    }

    let rate = f64::from(segment.frame_rate());
    let channels = usize::from(segment.channels());
    let width = segment.format().sample_width;
    let data = segment.raw_data();

    let thresh_rms = segment.max_possible_amplitude() * db_to_float(settings.threshold_db);
    let attack_frames = settings.attack_ms * rate / 1000.0;
    let release_frames = settings.release_ms * rate / 1000.0;
    let look_frames = attack_frames as usize;

    // prefix sums of per-frame squared sample sums, so each frame's
    // trailing-window RMS is O(1)
    let mut prefix = Vec::with_capacity(frame_count + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for frame in 0..frame_count {
        for ch in 0..channels {
            let sample = get_sample(data, width, frame * channels + ch)? as f64;
            acc += sample * sample;
        }
        prefix.push(acc);
    }
    let rms_before = |frame: usize| {
        let start = frame.saturating_sub(look_frames);
        let span = frame - start;
        if span == 0 {
            return 0.0;
        }
        ((prefix[frame] - prefix[start]) / (span * channels) as f64).sqrt().trunc()
    };
    let db_over_threshold = |rms: f64| {
        if rms == 0.0 {
            return 0.0;
        }
        ratio_to_db(rms / thresh_rms).max(0.0)
    };

    let mut output = Vec::with_capacity(data.len());
    let mut attenuation: f64 = 0.0;
    for frame in 0..frame_count {
        let rms_now = rms_before(frame);
        let max_attenuation = (1.0 - 1.0 / settings.ratio) * db_over_threshold(rms_now);

        if rms_now > thresh_rms && attenuation <= max_attenuation {
            attenuation += max_attenuation / attack_frames;
            attenuation = attenuation.min(max_attenuation);
        } else {
            attenuation -= max_attenuation / release_frames;
            attenuation = attenuation.max(0.0);
        }

        let bytes = segment.get_frame(frame);
        if attenuation == 0.0 {
            output.extend_from_slice(bytes);
        } else {
            output.extend_from_slice(&ops::mul(bytes, width, db_to_float(-attenuation))?);
        }
    }

    AudioSegment::from_format(output, segment.format())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(ms: i64, rate: u32, amplitude: i16) -> AudioSegment {
        let frames = (u64::from(rate) * ms as u64 / 1000) as usize;
        let data = (0..frames)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .flat_map(|v| v.to_le_bytes())
            .collect();
        AudioSegment::from_raw(data, 2, rate, 1).unwrap()
    }

    #[test]
    fn settings_validation_clamps_to_ranges() {
        let mut settings = CompressorSettings {
            threshold_db: -100.0,
            ratio: 50.0,
            attack_ms: 0.01,
            release_ms: 5000.0,
        };
        settings.validate();
        assert!((-60.0..=0.0).contains(&settings.threshold_db));
        assert!((1.0..=20.0).contains(&settings.ratio));
        assert!((0.1..=100.0).contains(&settings.attack_ms));
        assert!((10.0..=1000.0).contains(&settings.release_ms));
    }

    #[test]
    fn loud_audio_is_attenuated() {
        let seg = tone(500, 8000, 20_000);
        let out = compress_dynamic_range(&seg, &CompressorSettings::new()).unwrap();
        assert_eq!(out.len_ms(), seg.len_ms());
        // the first frames pass through while the attack ramps up, so
        // measure past the attack window
        let tail_in = seg.slice(Some(100), None).unwrap();
        let tail_out = out.slice(Some(100), None).unwrap();
        assert!(tail_out.rms().unwrap() < tail_in.rms().unwrap());
        assert!(tail_out.max().unwrap() < tail_in.max().unwrap());
    }

    #[test]
    fn audio_below_threshold_passes_through() {
        // rms 1000 is about -30 dBFS, well under the -20 dBFS threshold
        let seg = tone(200, 8000, 1000);
        let out = compress_dynamic_range(&seg, &CompressorSettings::new()).unwrap();
        assert_eq!(out.raw_data(), seg.raw_data());
    }

    #[test]
    fn empty_segment_is_a_noop() {
        let seg = AudioSegment::silent(0, 8000).unwrap();
        let out = compress_dynamic_range(&seg, &CompressorSettings::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn presets_differ_in_strength() {
        let seg = tone(500, 8000, 20_000);
        let gentle = compress_dynamic_range(&seg, &CompressorSettings::gentle()).unwrap();
        let aggressive = compress_dynamic_range(&seg, &CompressorSettings::aggressive()).unwrap();
        let tail = |s: &AudioSegment| s.slice(Some(100), None).unwrap().rms().unwrap();
        assert!(tail(&aggressive) < tail(&gentle));
    }
}
