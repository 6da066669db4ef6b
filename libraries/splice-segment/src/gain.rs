//! dB / linear-amplitude conversions.

/// Convert a gain in dB to the equivalent linear amplitude ratio.
///
/// `db_to_float(0.0) == 1.0`; -6 dB is roughly half amplitude.
pub fn db_to_float(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Convert a linear amplitude ratio to dB.
///
/// A ratio of zero maps to `-inf` (the dBFS of digital silence).
pub fn ratio_to_db(ratio: f64) -> f64 {
    20.0 * ratio.log10()
}

/// Two-value form: the dB of `val / reference`
pub fn ratio_to_db_with_reference(val: f64, reference: f64) -> f64 {
    ratio_to_db(val / reference)
}
