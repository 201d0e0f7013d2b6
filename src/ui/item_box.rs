//! Item Box
//!
//! An inventory slot: icon, stack count label and an optional highlight effect
//! while selected. Item boxes are pooled; a box is composed of
//!
//! ```text
//! ItemBox
//! ├── own fields   item, icon, count, label font, selection
//! ├── highlight    ParticleView
//! └── view         ViewState (base)
//! ```
//!
//! `reuse` initializes base-first (view, highlight, own fields); `clear_data`
//! unwinds in the opposite order so the base view is cleared last.
//!
//! `clear_data` cannot reach the `ParticleSystem`, so a selected box must be
//! `recycle`d before it goes back to a pool (`Engine::release_item_box` does
//! both).

use macroquad::math::Vec2;

use crate::atlas::FrameLookup;
use crate::cache::{FontSizeCache, ParticleCache};
use crate::particle::{ParticleRuntime, ParticleSystem};
use crate::pool::Poolable;

use super::particle_view::ParticleView;
use super::view::{ViewArgs, ViewState};

#[derive(Debug, Clone, PartialEq)]
pub struct ItemBoxArgs {
    pub item: String,
    /// Frame name of the item icon
    pub icon: String,
    pub count: u32,
    pub position: Vec2,
    pub size: Vec2,
}

impl ItemBoxArgs {
    pub fn new(item: impl Into<String>, icon: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            icon: icon.into(),
            count,
            position: Vec2::ZERO,
            size: Vec2::new(32.0, 32.0),
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }
}

pub struct ItemBox<R: ParticleRuntime> {
    pub view: ViewState,
    highlight: ParticleView<R>,
    item: Option<String>,
    icon: Option<String>,
    count: u32,
    /// Baked font used for the count label
    label_font: Option<String>,
    selected: bool,
}

impl<R: ParticleRuntime> ItemBox<R> {
    /// Resolve the icon frame and the label font.
    ///
    /// A missing icon frame leaves the box without a frame; a family without
    /// baked sizes falls back to the family name itself.
    pub fn bind(&mut self, frames: &dyn FrameLookup, fonts: &FontSizeCache, family: &str, label_size: u32) {
        self.view.frame = self.icon.as_deref().and_then(|icon| frames.get_frame(icon));
        self.label_font = Some(fonts.get_font_name(family, label_size));
    }

    /// Select the box and play `effect` as its highlight
    pub fn select(&mut self, system: &mut ParticleSystem<R>, cache: &ParticleCache, effect: &str) -> bool {
        self.selected = true;
        self.highlight.play(system, cache, effect)
    }

    pub fn deselect(&mut self, system: &mut ParticleSystem<R>) {
        self.selected = false;
        self.highlight.stop(system, false);
    }

    pub fn update(&mut self, system: &mut ParticleSystem<R>) {
        self.highlight.update(system);
    }

    /// Stop the highlight and clear the box, ready to go back to a pool
    pub fn recycle(&mut self, system: &mut ParticleSystem<R>) {
        self.highlight.stop(system, true);
        self.clear_data();
    }

    pub fn set_count(&mut self, count: u32) {
        self.count = count;
    }

    /// Text of the stack label; empty for single items
    pub fn count_text(&self) -> String {
        if self.count > 1 {
            format!("x{}", self.count)
        } else {
            String::new()
        }
    }

    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn label_font(&self) -> Option<&str> {
        self.label_font.as_deref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn highlight(&self) -> &ParticleView<R> {
        &self.highlight
    }
}

impl<R: ParticleRuntime> Default for ItemBox<R> {
    fn default() -> Self {
        Self {
            view: ViewState::default(),
            highlight: ParticleView::default(),
            item: None,
            icon: None,
            count: 0,
            label_font: None,
            selected: false,
        }
    }
}

impl<R: ParticleRuntime> Poolable for ItemBox<R> {
    type Args = ItemBoxArgs;

    fn reuse(&mut self, args: ItemBoxArgs) {
        self.view.reuse(ViewArgs {
            position: args.position,
            size: args.size,
        });
        self.highlight.reuse(true);
        self.item = Some(args.item);
        self.icon = Some(args.icon);
        self.count = args.count;
        self.label_font = None;
        self.selected = false;
    }

    fn clear_data(&mut self) {
        self.item = None;
        self.icon = None;
        self.count = 0;
        self.label_font = None;
        self.selected = false;
        self.highlight.clear_data();
        self.view.clear_data();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{FrameRegistry, GridDescriptor, TextureAtlas};
    use crate::diagnostics::RecordingDiagnostics;
    use crate::particle::tests::{cache_with_pack, MockRuntime};
    use crate::pool::Pool;

    fn frames() -> FrameRegistry {
        let atlas = TextureAtlas::from_grid(&GridDescriptor {
            texture: "items.png".to_string(),
            width: 64.0,
            height: 32.0,
            cell_width: 32.0,
            cell_height: 32.0,
            spacing: 0.0,
            margin: 0.0,
            prefix: "item".to_string(),
            count: None,
        })
        .unwrap();
        let mut registry = FrameRegistry::new();
        registry.add_atlas(&atlas, &RecordingDiagnostics::new());
        registry
    }

    fn fonts() -> FontSizeCache {
        let mut fonts = FontSizeCache::new();
        fonts.add_font_size("Pixel", 8);
        fonts.add_font_size("Pixel", 16);
        fonts
    }

    #[test]
    fn test_bind_resolves_icon_and_font() {
        let mut item: ItemBox<MockRuntime> = ItemBox::create(ItemBoxArgs::new("potion", "item_1", 3));
        item.bind(&frames(), &fonts(), "Pixel", 12);

        assert_eq!(item.view.frame.as_ref().unwrap().name, "item_1");
        assert_eq!(item.label_font(), Some("Pixel_16"));
        assert_eq!(item.count_text(), "x3");
    }

    #[test]
    fn test_missing_icon_leaves_no_frame() {
        let mut item: ItemBox<MockRuntime> = ItemBox::create(ItemBoxArgs::new("key", "item_9", 1));
        item.bind(&frames(), &fonts(), "Serif", 12);

        assert!(item.view.frame.is_none());
        assert_eq!(item.label_font(), Some("Serif"));
        assert_eq!(item.count_text(), "");
    }

    #[test]
    fn test_select_and_recycle_release_usage() {
        let cache = cache_with_pack();
        let mut system = ParticleSystem::new(MockRuntime::default());
        let mut item: ItemBox<MockRuntime> = ItemBox::create(ItemBoxArgs::new("gem", "item_0", 1));

        assert!(item.select(&mut system, &cache, "spark"));
        assert!(item.is_selected());
        assert_eq!(system.usage("pack1"), 1);

        item.recycle(&mut system);
        assert_eq!(system.usage("pack1"), 0);
        assert!(item.item().is_none());
        assert!(!item.view.visible);
    }

    #[test]
    fn test_deselect() {
        let cache = cache_with_pack();
        let mut system = ParticleSystem::new(MockRuntime::default());
        let mut item: ItemBox<MockRuntime> = ItemBox::create(ItemBoxArgs::new("gem", "item_0", 1));

        item.select(&mut system, &cache, "burst");
        item.deselect(&mut system);
        assert!(!item.is_selected());
        assert!(!item.highlight().is_playing());
        assert!(!system.is_instantiated("pack1"));
    }

    #[test]
    fn test_pooled_box_matches_fresh() {
        let cache = cache_with_pack();
        let mut system = ParticleSystem::new(MockRuntime::default());
        let mut pool: Pool<ItemBox<MockRuntime>> = Pool::new(4);

        let mut first = pool.acquire(ItemBoxArgs::new("gem", "item_0", 5).at(Vec2::new(8.0, 8.0)));
        first.bind(&frames(), &fonts(), "Pixel", 4);
        first.select(&mut system, &cache, "spark");
        first.highlight.stop(&mut system, true);
        pool.release(first);

        let args = ItemBoxArgs::new("coin", "item_1", 2);
        let reused = pool.acquire(args.clone());
        let fresh: ItemBox<MockRuntime> = ItemBox::create(args);

        assert_eq!(pool.reused(), 1);
        assert_eq!(reused.view, fresh.view);
        assert_eq!(reused.item(), fresh.item());
        assert_eq!(reused.icon(), fresh.icon());
        assert_eq!(reused.count(), fresh.count());
        assert_eq!(reused.label_font(), fresh.label_font());
        assert_eq!(reused.is_selected(), fresh.is_selected());
        assert_eq!(reused.highlight().auto_release(), fresh.highlight().auto_release());
        assert!(!reused.highlight().is_playing());
    }
}
