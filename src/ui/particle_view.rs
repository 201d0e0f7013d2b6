//! Particle effect component
//!
//! Attached to a widget to play one emitter or sequence. The component owns
//! the live handle and the usage it took on the source; `stop` gives both
//! back. Always `stop` before `clear_data`, otherwise the source's usage
//! counter is never decremented.

use crate::cache::ParticleCache;
use crate::event::EventQueue;
use crate::particle::{EffectEvent, EffectHandle, ParticleHandle, ParticleRuntime, ParticleSystem};
use crate::pool::Poolable;

pub struct ParticleView<R: ParticleRuntime> {
    /// Item currently playing
    item: Option<String>,
    /// Source the usage was taken on
    source: Option<String>,
    handle: Option<ParticleHandle<R>>,
    /// Release the effect automatically once it reports `Completed`
    auto_release: bool,
    finished: bool,
    events: EventQueue<EffectEvent>,
}

impl<R: ParticleRuntime> ParticleView<R> {
    /// Start playing `item`, stopping whatever played before.
    /// Returns `false` if the system could not produce the effect.
    pub fn play(&mut self, system: &mut ParticleSystem<R>, cache: &ParticleCache, item: &str) -> bool {
        self.stop(system, true);

        let Some(generated) = system.generate_particle(cache, item) else {
            return false;
        };
        let mut handle = generated.handle;
        handle.init();

        self.item = Some(item.to_string());
        self.source = Some(generated.entry.source().to_string());
        self.handle = Some(handle);
        self.finished = false;
        true
    }

    /// Pull notifications from the handle into the event queue
    pub fn update(&mut self, system: &mut ParticleSystem<R>) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        while let Some(event) = handle.poll_event() {
            if event == EffectEvent::Completed {
                self.finished = true;
            }
            self.events.send(event);
        }
        if self.finished && self.auto_release {
            self.stop(system, false);
        }
    }

    /// Stop the effect and release its usage. Safe when nothing is playing.
    pub fn stop(&mut self, system: &mut ParticleSystem<R>, immediate: bool) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop(immediate);
        }
        if let Some(source) = self.source.take() {
            system.release(&source);
        }
        self.item = None;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if let Some(handle) = self.handle.as_mut() {
            handle.set_paused(paused);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_paused())
    }

    pub fn is_playing(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn auto_release(&self) -> bool {
        self.auto_release
    }

    /// Drain notifications gathered by `update`
    pub fn drain_events(&mut self) -> Vec<EffectEvent> {
        self.events.drain().collect()
    }
}

impl<R: ParticleRuntime> Default for ParticleView<R> {
    fn default() -> Self {
        Self {
            item: None,
            source: None,
            handle: None,
            auto_release: false,
            finished: false,
            events: EventQueue::new(),
        }
    }
}

impl<R: ParticleRuntime> Poolable for ParticleView<R> {
    /// Whether to release automatically on completion
    type Args = bool;

    fn reuse(&mut self, auto_release: bool) {
        if let Some(source) = &self.source {
            tracing::warn!(source = %source, "particle view reused while still holding a usage");
        }
        self.item = None;
        self.source = None;
        self.handle = None;
        self.auto_release = auto_release;
        self.finished = false;
        self.events.clear();
    }

    fn clear_data(&mut self) {
        if let Some(source) = &self.source {
            tracing::warn!(source = %source, "particle view cleared while still holding a usage");
        }
        self.item = None;
        self.source = None;
        self.handle = None;
        self.auto_release = false;
        self.finished = false;
        self.events.clear();
    }
}
