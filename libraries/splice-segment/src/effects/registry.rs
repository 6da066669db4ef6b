use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, SegmentError};
use crate::segment::AudioSegment;

type EffectFn = dyn Fn(&AudioSegment) -> Result<AudioSegment> + Send + Sync;

/// A caller-owned registry mapping effect names to segment transforms.
///
/// Effects are plain `AudioSegment -> AudioSegment` functions; parameters
/// are baked in at registration time by the closure. The registry is local
/// state composed by the caller, there is no global effect table.
#[derive(Default)]
pub struct EffectRegistry {
    effects: HashMap<String, Box<EffectFn>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect under a name, replacing any previous entry
    pub fn register<F>(&mut self, name: impl Into<String>, effect: F)
    where
        F: Fn(&AudioSegment) -> Result<AudioSegment> + Send + Sync + 'static,
    {
        self.effects.insert(name.into(), Box::new(effect));
    }

    /// Remove a registered effect, returning whether it existed
    pub fn unregister(&mut self, name: &str) -> bool {
        self.effects.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    /// Registered effect names, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(String::as_str)
    }

    /// Apply a registered effect to a segment
    pub fn apply(&self, name: &str, segment: &AudioSegment) -> Result<AudioSegment> {
        let effect = self
            .effects
            .get(name)
            .ok_or_else(|| SegmentError::InvalidArgument(format!("unknown effect `{name}`")))?;
        effect(segment)
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("EffectRegistry")
            .field("effects", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::normalize;

    fn seg() -> AudioSegment {
        let data = [4000i16, -4000, 2000, -2000]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        AudioSegment::from_raw(data, 2, 8000, 1).unwrap()
    }

    #[test]
    fn registered_effect_is_applied() {
        let mut registry = EffectRegistry::new();
        registry.register("quieter", |s: &AudioSegment| s.apply_gain(-6.0));

        let out = registry.apply("quieter", &seg()).unwrap();
        assert!(out.rms().unwrap() < seg().rms().unwrap());
    }

    #[test]
    fn closures_capture_their_parameters() {
        let mut registry = EffectRegistry::new();
        let headroom = 1.0;
        registry.register("normalize", move |s: &AudioSegment| normalize(s, headroom));

        let out = registry.apply("normalize", &seg()).unwrap();
        assert!((out.max_dbfs().unwrap() - (-1.0)).abs() < 0.05);
    }

    #[test]
    fn unknown_effect_is_an_error() {
        let registry = EffectRegistry::new();
        assert!(matches!(
            registry.apply("missing", &seg()),
            Err(SegmentError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unregister_removes_the_entry() {
        let mut registry = EffectRegistry::new();
        registry.register("noop", |s: &AudioSegment| Ok(s.clone()));
        assert!(registry.contains("noop"));
        assert!(registry.unregister("noop"));
        assert!(!registry.contains("noop"));
        assert!(!registry.unregister("noop"));
    }
}
