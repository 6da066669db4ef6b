use crate::error::Result;
use crate::gain::{db_to_float, ratio_to_db};
use crate::segment::AudioSegment;

/// Boost the segment so its peak sample sits `headroom_db` below full scale.
///
/// A fully silent segment is returned unchanged; there is no peak to place.
pub fn normalize(segment: &AudioSegment, headroom_db: f64) -> Result<AudioSegment> {
    let peak = segment.max()?;
    if peak == 0 {
        return Ok(segment.clone());
    }

    let target_peak = segment.max_possible_amplitude() * db_to_float(-headroom_db);
    let needed_boost = ratio_to_db(target_peak / peak as f64);
    segment.apply_gain(needed_boost)
}
