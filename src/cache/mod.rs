//! Domain caches
//!
//! Each cache owns its own repositories and layers domain rules on top:
//!
//! ```text
//! Caches
//! ├── bundles    BundleCache      asset + locale bundles, duplicate names rejected
//! ├── particles  ParticleCache    particle sources + emitter/sequence index
//! ├── skeletons  SpineCache<S>    parsed skeletons, frames resolved on add
//! ├── fonts      FontSizeCache    baked font sizes per family
//! └── frames     FrameRegistry    atlas frames by name
//! ```
//!
//! `Caches` is built once and passed to whatever needs it; nothing here is
//! global.

mod bundle;
mod font;
mod particle;
mod spine;

pub use bundle::{
    AssetBundle, AssetBundleDescriptor, BundleCache, LocaleBundle, LocaleBundleDescriptor,
};
pub use font::FontSizeCache;
pub use particle::{
    EmitterDef, ParticleCache, ParticleData, ParticleEntry, ParticleKind, SequenceDef,
    SequenceStep,
};
pub use spine::{
    resolve_frames, Attachment, AttachmentDesc, BasicSkeletonParser, Bone, BoneDesc, FrameMap,
    Skeleton, SkeletonDescription, SkeletonParser, Skin, SkinDesc, Slot, SlotDesc, SpineCache,
};

use crate::atlas::FrameRegistry;

/// Every cache the engine uses, as one explicitly passed context
#[derive(Debug)]
pub struct Caches<S = Skeleton> {
    pub bundles: BundleCache,
    pub particles: ParticleCache,
    pub skeletons: SpineCache<S>,
    pub fonts: FontSizeCache,
    pub frames: FrameRegistry,
}

impl<S> Caches<S> {
    pub fn new() -> Self {
        Self {
            bundles: BundleCache::new(),
            particles: ParticleCache::new(),
            skeletons: SpineCache::new(),
            fonts: FontSizeCache::new(),
            frames: FrameRegistry::new(),
        }
    }

    /// Empty every cache
    pub fn clear(&mut self) {
        self.bundles.clear();
        self.particles.clear();
        self.skeletons.clear();
        self.fonts.clear();
        self.frames.clear();
    }
}

impl<S> Default for Caches<S> {
    fn default() -> Self {
        Self::new()
    }
}
