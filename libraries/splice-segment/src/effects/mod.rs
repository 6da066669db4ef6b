//! Effects built purely from the segment primitives: peak normalization,
//! dynamic-range compression and chunk-splicing speedup, plus a registry
//! for caller-provided effects.

mod compressor;
mod normalize;
mod registry;
mod speedup;

pub use compressor::{compress_dynamic_range, CompressorSettings};
pub use normalize::normalize;
pub use registry::EffectRegistry;
pub use speedup::{speedup, SpeedupSettings};
