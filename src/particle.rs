//! Particle System
//!
//! Binds cached particle sources to the external particle runtime. A source is
//! pushed into the runtime the first time any of its emitters or sequences is
//! requested, and a usage counter per source tracks how many live effects were
//! handed out from it:
//!
//! ```text
//! generate("spark")  -> index: spark @ pack1 -> pack1 not live -> init_bundle(pack1), count = 1
//! generate("smoke")  -> index: smoke @ pack1 -> pack1 live     -> count = 2
//! release("pack1")   -> count = 1
//! release("pack1")   -> count = 0 -> release_bundle(pack1), counter dropped
//! ```
//!
//! The counter never goes negative and only reaches zero once every consumer
//! has released. Releasing is the consumer's job (see `ui::ParticleView`).

use crate::cache::{ParticleCache, ParticleData, ParticleEntry};
use crate::repository::Repository;

/// Notifications raised by a live emitter or sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectEvent {
    /// First particles spawned
    Started,
    /// Emission finished; particles may still be alive
    Exhausted,
    /// Every particle is gone
    Completed,
}

/// A live emitter or sequence owned by the runtime
pub trait EffectHandle {
    /// (Re)start the effect
    fn init(&mut self);
    /// Stop emitting; `immediate` also kills live particles
    fn stop(&mut self, immediate: bool);
    fn set_paused(&mut self, paused: bool);
    fn is_paused(&self) -> bool;
    /// Next pending notification, if any
    fn poll_event(&mut self) -> Option<EffectEvent>;
}

/// The external particle runtime
pub trait ParticleRuntime {
    type Emitter: EffectHandle;
    type Sequence: EffectHandle;

    /// Make a source's emitters and sequences available
    fn init_bundle(&mut self, source: &str, data: &ParticleData);
    /// Tear down a source previously passed to `init_bundle`
    fn release_bundle(&mut self, source: &str);
    fn particle_emitter(&mut self, name: &str) -> Option<Self::Emitter>;
    fn effect_sequence(&mut self, name: &str) -> Option<Self::Sequence>;
}

/// Either kind of live effect
pub enum ParticleHandle<R: ParticleRuntime> {
    Emitter(R::Emitter),
    Sequence(R::Sequence),
}

impl<R: ParticleRuntime> EffectHandle for ParticleHandle<R> {
    fn init(&mut self) {
        match self {
            ParticleHandle::Emitter(h) => h.init(),
            ParticleHandle::Sequence(h) => h.init(),
        }
    }

    fn stop(&mut self, immediate: bool) {
        match self {
            ParticleHandle::Emitter(h) => h.stop(immediate),
            ParticleHandle::Sequence(h) => h.stop(immediate),
        }
    }

    fn set_paused(&mut self, paused: bool) {
        match self {
            ParticleHandle::Emitter(h) => h.set_paused(paused),
            ParticleHandle::Sequence(h) => h.set_paused(paused),
        }
    }

    fn is_paused(&self) -> bool {
        match self {
            ParticleHandle::Emitter(h) => h.is_paused(),
            ParticleHandle::Sequence(h) => h.is_paused(),
        }
    }

    fn poll_event(&mut self) -> Option<EffectEvent> {
        match self {
            ParticleHandle::Emitter(h) => h.poll_event(),
            ParticleHandle::Sequence(h) => h.poll_event(),
        }
    }
}

/// Result of [`ParticleSystem::generate_particle`]
pub struct GeneratedParticle<R: ParticleRuntime> {
    /// Index entry the handle was created from (carries the source name)
    pub entry: ParticleEntry,
    pub handle: ParticleHandle<R>,
}

/// Reference-counted binding between the particle cache and the runtime
pub struct ParticleSystem<R: ParticleRuntime> {
    runtime: R,
    /// Live handles per source; a source is present only while its count > 0
    usage: Repository<u32>,
}

impl<R: ParticleRuntime> ParticleSystem<R> {
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            usage: Repository::new(),
        }
    }

    /// Create a live emitter or sequence for an indexed item name.
    ///
    /// Returns `None` if the item is not indexed, its source data is gone, or
    /// the runtime has no such item. In the last case the usage taken for the
    /// call is handed back.
    pub fn generate_particle(
        &mut self,
        cache: &ParticleCache,
        item: &str,
    ) -> Option<GeneratedParticle<R>> {
        let entry = cache.get_particle(item)?.clone();
        let source = entry.source();

        match self.usage.get_mut(source) {
            Some(count) => *count += 1,
            None => {
                let data = cache.get(source)?;
                self.runtime.init_bundle(source, &data);
                self.usage.add(source, 1);
                tracing::debug!(source, "particle bundle initialized");
            }
        }

        let handle = match &entry {
            ParticleEntry::Emitter { name, .. } => {
                self.runtime.particle_emitter(name).map(ParticleHandle::Emitter)
            }
            ParticleEntry::Sequence { name, .. } => {
                self.runtime.effect_sequence(name).map(ParticleHandle::Sequence)
            }
        };

        match handle {
            Some(handle) => Some(GeneratedParticle { entry, handle }),
            None => {
                tracing::debug!(item, source, "runtime has no handle for item");
                self.release(source);
                None
            }
        }
    }

    /// Drop one usage of `source`. Tears the runtime bundle down when the last
    /// usage goes away. Returns the remaining count, or `None` if the source
    /// was not live.
    pub fn release(&mut self, source: &str) -> Option<u32> {
        let count = self.usage.get_mut(source)?;
        *count = count.saturating_sub(1);
        let remaining = *count;

        if remaining == 0 {
            self.usage.remove(source);
            self.runtime.release_bundle(source);
            tracing::debug!(source, "particle bundle released");
        }
        Some(remaining)
    }

    /// Live usages of a source (0 when not instantiated)
    pub fn usage(&self, source: &str) -> u32 {
        self.usage.get(source).copied().unwrap_or(0)
    }

    pub fn is_instantiated(&self, source: &str) -> bool {
        self.usage.has(source)
    }

    /// Sources currently pushed into the runtime, in instantiation order
    pub fn instantiated(&self) -> &[String] {
        self.usage.keys()
    }

    /// Tear down every live bundle regardless of usage
    pub fn shutdown(&mut self) {
        for source in self.usage.keys().to_vec() {
            self.runtime.release_bundle(&source);
        }
        self.usage.clear();
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::{EmitterDef, SequenceDef};
    use std::collections::{HashMap, VecDeque};

    #[derive(Debug, Default)]
    pub(crate) struct MockHandle {
        pub name: String,
        pub paused: bool,
        pub running: bool,
        pub stopped_immediately: bool,
        pub events: VecDeque<EffectEvent>,
    }

    impl EffectHandle for MockHandle {
        fn init(&mut self) {
            self.running = true;
            self.events.push_back(EffectEvent::Started);
        }

        fn stop(&mut self, immediate: bool) {
            self.running = false;
            self.stopped_immediately = immediate;
        }

        fn set_paused(&mut self, paused: bool) {
            self.paused = paused;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn poll_event(&mut self) -> Option<EffectEvent> {
            self.events.pop_front()
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct MockRuntime {
        pub inits: HashMap<String, usize>,
        pub releases: HashMap<String, usize>,
        pub known: Vec<String>,
    }

    impl ParticleRuntime for MockRuntime {
        type Emitter = MockHandle;
        type Sequence = MockHandle;

        fn init_bundle(&mut self, source: &str, data: &ParticleData) {
            *self.inits.entry(source.to_string()).or_default() += 1;
            self.known.extend(data.emitters.iter().map(|e| e.name.clone()));
            self.known.extend(data.sequences.iter().map(|s| s.name.clone()));
        }

        fn release_bundle(&mut self, source: &str) {
            *self.releases.entry(source.to_string()).or_default() += 1;
        }

        fn particle_emitter(&mut self, name: &str) -> Option<MockHandle> {
            self.known.iter().any(|k| k == name).then(|| MockHandle {
                name: name.to_string(),
                ..Default::default()
            })
        }

        fn effect_sequence(&mut self, name: &str) -> Option<MockHandle> {
            self.particle_emitter(name)
        }
    }

    pub(crate) fn cache_with_pack() -> ParticleCache {
        let mut cache = ParticleCache::new();
        cache.add(
            "pack1",
            ParticleData {
                emitters: vec![EmitterDef::named("spark"), EmitterDef::named("smoke")],
                sequences: vec![SequenceDef::named("burst")],
            },
        );
        cache
    }

    #[test]
    fn test_bundle_initialized_once() {
        let cache = cache_with_pack();
        let mut system = ParticleSystem::new(MockRuntime::default());

        let spark = system.generate_particle(&cache, "spark").unwrap();
        let smoke = system.generate_particle(&cache, "smoke").unwrap();
        let burst = system.generate_particle(&cache, "burst").unwrap();

        assert_eq!(system.runtime().inits["pack1"], 1);
        assert_eq!(system.usage("pack1"), 3);
        assert!(matches!(spark.handle, ParticleHandle::Emitter(_)));
        assert!(matches!(smoke.handle, ParticleHandle::Emitter(_)));
        assert!(matches!(burst.handle, ParticleHandle::Sequence(_)));
        assert_eq!(burst.entry.source(), "pack1");
    }

    #[test]
    fn test_unknown_item() {
        let cache = cache_with_pack();
        let mut system = ParticleSystem::new(MockRuntime::default());

        assert!(system.generate_particle(&cache, "nope").is_none());
        assert!(system.runtime().inits.is_empty());
        assert!(!system.is_instantiated("pack1"));
    }

    #[test]
    fn test_dangling_index_entry() {
        let mut cache = cache_with_pack();
        cache.remove("pack1");
        let mut system = ParticleSystem::new(MockRuntime::default());

        assert!(system.generate_particle(&cache, "spark").is_none());
        assert_eq!(system.usage("pack1"), 0);
        assert!(system.runtime().inits.is_empty());
    }

    #[test]
    fn test_release_counts_down_to_teardown() {
        let cache = cache_with_pack();
        let mut system = ParticleSystem::new(MockRuntime::default());
        system.generate_particle(&cache, "spark").unwrap();
        system.generate_particle(&cache, "burst").unwrap();

        assert_eq!(system.release("pack1"), Some(1));
        assert!(system.runtime().releases.is_empty());
        assert_eq!(system.release("pack1"), Some(0));
        assert_eq!(system.runtime().releases["pack1"], 1);

        // Never negative: further releases are ignored
        assert_eq!(system.release("pack1"), None);
        assert_eq!(system.usage("pack1"), 0);
        assert_eq!(system.runtime().releases["pack1"], 1);
    }

    #[test]
    fn test_reinstantiated_after_teardown() {
        let cache = cache_with_pack();
        let mut system = ParticleSystem::new(MockRuntime::default());
        system.generate_particle(&cache, "spark").unwrap();
        system.release("pack1");
        system.generate_particle(&cache, "spark").unwrap();

        assert_eq!(system.runtime().inits["pack1"], 2);
        assert_eq!(system.usage("pack1"), 1);
    }

    #[test]
    fn test_missing_runtime_handle_rolls_back() {
        let cache = cache_with_pack();
        let mut system = ParticleSystem::new(MockRuntime::default());
        system.generate_particle(&cache, "spark").unwrap();

        system.runtime_mut().known.retain(|k| k != "smoke");
        assert!(system.generate_particle(&cache, "smoke").is_none());
        assert_eq!(system.usage("pack1"), 1);
    }

    #[test]
    fn test_handle_dispatch() {
        let cache = cache_with_pack();
        let mut system = ParticleSystem::new(MockRuntime::default());
        let mut generated = system.generate_particle(&cache, "burst").unwrap();

        generated.handle.init();
        generated.handle.set_paused(true);
        assert!(generated.handle.is_paused());
        assert_eq!(generated.handle.poll_event(), Some(EffectEvent::Started));
        assert_eq!(generated.handle.poll_event(), None);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut cache = cache_with_pack();
        cache.add(
            "pack2",
            ParticleData {
                emitters: vec![EmitterDef::named("rain")],
                sequences: Vec::new(),
            },
        );
        let mut system = ParticleSystem::new(MockRuntime::default());
        system.generate_particle(&cache, "spark").unwrap();
        system.generate_particle(&cache, "rain").unwrap();
        assert_eq!(system.instantiated(), ["pack1", "pack2"]);

        system.shutdown();
        assert!(system.instantiated().is_empty());
        assert_eq!(system.runtime().releases.len(), 2);
    }
}
