//! Engine context
//!
//! All process-wide state in one place, built once at startup and passed by
//! reference to whatever needs it.

use crate::cache::{Caches, SkeletonParser};
use crate::config::EngineConfig;
use crate::diagnostics::Diagnostics;
use crate::easing::Tween;
use crate::loader::{AssetLoader, DirSource, LoadError, LoadReport};
use crate::particle::{ParticleRuntime, ParticleSystem};
use crate::pool::Pool;
use crate::ui::ItemBox;

pub struct Engine<R: ParticleRuntime, P: SkeletonParser> {
    pub config: EngineConfig,

    /// Shared asset caches
    pub caches: Caches<P::Skeleton>,

    /// Particle usage bookkeeping on top of the runtime
    pub particles: ParticleSystem<R>,

    /// Recycled inventory slots. Return boxes through `release_item_box`;
    /// a bare `Pool::release` cannot hand back the highlight's particle usage.
    pub item_boxes: Pool<ItemBox<R>>,

    /// Recycled tweens
    pub tweens: Pool<Tween>,

    parser: P,
    loader: AssetLoader<DirSource>,
}

impl<R: ParticleRuntime, P: SkeletonParser> Engine<R, P> {
    pub fn new(config: EngineConfig, runtime: R, parser: P) -> Self {
        let loader = AssetLoader::from_config(&config);
        Self {
            caches: Caches::new(),
            particles: ParticleSystem::new(runtime),
            item_boxes: Pool::new(config.view_pool_capacity),
            tweens: Pool::new(config.tween_pool_capacity),
            parser,
            loader,
            config,
        }
    }

    /// Load everything listed in the configured manifest
    pub fn load_assets(&mut self, diag: &dyn Diagnostics) -> Result<LoadReport, LoadError> {
        let manifest = self.config.manifest_file.clone();
        self.loader
            .load_manifest(&manifest, &mut self.caches, &self.parser, diag)
    }

    /// Stop the box's highlight, release its particle usage and return it to
    /// the pool. Returns `false` if the pool was full and the box was dropped.
    pub fn release_item_box(&mut self, mut item: ItemBox<R>) -> bool {
        item.recycle(&mut self.particles);
        self.item_boxes.release(item)
    }

    /// Tear down live particle bundles, drop pooled objects and empty caches
    pub fn shutdown(&mut self) {
        self.particles.shutdown();
        self.item_boxes.clear();
        self.tweens.clear();
        self.caches.clear();
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::BasicSkeletonParser;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::easing::{Easing, TweenArgs};
    use crate::particle::tests::MockRuntime;
    use crate::ui::ItemBoxArgs;

    fn engine_with_assets(dir: &std::path::Path) -> Engine<MockRuntime, BasicSkeletonParser> {
        std::fs::create_dir_all(dir.join("particles")).unwrap();
        std::fs::create_dir_all(dir.join("fonts")).unwrap();
        std::fs::write(
            dir.join("manifest.txt"),
            "[particles]\npack1.ron\n\n[fonts]\nfonts.ron\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("particles/pack1.ron"),
            r#"(emitters: [(name: "spark")])"#,
        )
        .unwrap();
        std::fs::write(dir.join("fonts/fonts.ron"), r#"(fonts: {"Pixel": [8, 16]})"#).unwrap();

        let config = EngineConfig {
            asset_dir: dir.to_path_buf(),
            view_pool_capacity: 2,
            ..EngineConfig::default()
        };
        Engine::new(config, MockRuntime::default(), BasicSkeletonParser)
    }

    #[test]
    fn test_load_assets_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_with_assets(dir.path());
        let diag = RecordingDiagnostics::new();

        let report = engine.load_assets(&diag).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.loaded.len(), 2);
        assert_eq!(engine.caches.fonts.get_font_name("Pixel", 12), "Pixel_16");
        assert_eq!(engine.item_boxes.capacity(), 2);
    }

    #[test]
    fn test_missing_manifest_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            asset_dir: dir.path().to_path_buf(),
            ..EngineConfig::default()
        };
        let mut engine: Engine<MockRuntime, BasicSkeletonParser> =
            Engine::new(config, MockRuntime::default(), BasicSkeletonParser);

        let result = engine.load_assets(&RecordingDiagnostics::new());
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_item_box_lifecycle_through_engine() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_with_assets(dir.path());
        engine.load_assets(&RecordingDiagnostics::new()).unwrap();

        let mut item = engine.item_boxes.acquire(ItemBoxArgs::new("gem", "gem_icon", 2));
        assert!(item.select(&mut engine.particles, &engine.caches.particles, "spark"));
        assert!(engine.particles.is_instantiated("pack1"));

        assert!(engine.release_item_box(item));
        assert!(!engine.particles.is_instantiated("pack1"));
        assert_eq!(engine.item_boxes.idle(), 1);

        let tween = engine.tweens.acquire(TweenArgs::new(0.0, 1.0, 1.0, Easing::Linear));
        assert_eq!(tween.value(), 0.0);
        engine.tweens.release(tween);

        engine.shutdown();
        assert_eq!(engine.item_boxes.idle(), 0);
        assert!(engine.caches.particles.names().is_empty());
    }

    #[test]
    fn test_released_selected_box_hands_back_usage() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_with_assets(dir.path());
        engine.load_assets(&RecordingDiagnostics::new()).unwrap();

        let mut first = engine.item_boxes.acquire(ItemBoxArgs::new("gem", "gem_icon", 1));
        let mut second = engine.item_boxes.acquire(ItemBoxArgs::new("orb", "orb_icon", 1));
        first.select(&mut engine.particles, &engine.caches.particles, "spark");
        second.select(&mut engine.particles, &engine.caches.particles, "spark");
        assert_eq!(engine.particles.usage("pack1"), 2);

        engine.release_item_box(first);
        assert_eq!(engine.particles.usage("pack1"), 1);
        engine.release_item_box(second);
        assert_eq!(engine.particles.usage("pack1"), 0);
        assert!(!engine.particles.is_instantiated("pack1"));
        assert_eq!(engine.particles.runtime().releases["pack1"], 1);

        // Reacquired box starts without a highlight
        let again = engine.item_boxes.acquire(ItemBoxArgs::new("key", "key_icon", 1));
        assert!(!again.highlight().is_playing());
        assert!(again.highlight().source().is_none());
    }
}
