//! UI consumers of the caches
//!
//! Widgets are plain state: they resolve frames and fonts through the caches,
//! take particle usages through the `ParticleSystem`, and give everything back
//! when recycled. Drawing is left to the host renderer.

mod item_box;
mod particle_view;
mod view;

pub use item_box::{ItemBox, ItemBoxArgs};
pub use particle_view::ParticleView;
pub use view::{ViewArgs, ViewState};
