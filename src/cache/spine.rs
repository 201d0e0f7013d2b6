//! Skeleton cache
//!
//! Skeleton descriptions reference atlas frames through their attachments.
//! Adding a skeleton resolves every attachment's frame (the explicit `path`,
//! or the attachment key when there is none), hands the resulting frame map
//! and the raw description to a parser, and caches the parsed result.
//!
//! Unresolved frames are warnings, not failures: the skeleton is still cached
//! and renders with those attachments missing.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::atlas::{Frame, FrameLookup};
use crate::diagnostics::{Diagnostics, WarnCode};
use crate::repository::Repository;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneDesc {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub length: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDesc {
    pub name: String,
    pub bone: String,
    /// Attachment shown in the setup pose
    #[serde(default)]
    pub attachment: Option<String>,
}

fn one() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentDesc {
    /// Frame name; the attachment key is used when absent
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "one")]
    pub scale_x: f32,
    #[serde(default = "one")]
    pub scale_y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl AttachmentDesc {
    /// Frame identifier for an attachment stored under `key`
    pub fn frame_id<'a>(&'a self, key: &'a str) -> &'a str {
        self.path.as_deref().unwrap_or(key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinDesc {
    pub name: String,
    /// slot name -> attachment key -> attachment
    #[serde(default)]
    pub attachments: BTreeMap<String, BTreeMap<String, AttachmentDesc>>,
}

/// Raw skeleton description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonDescription {
    #[serde(default)]
    pub bones: Vec<BoneDesc>,
    #[serde(default)]
    pub slots: Vec<SlotDesc>,
    #[serde(default)]
    pub skins: Vec<SkinDesc>,
}

/// Frame identifier -> resolved frame (`None` when the lookup had nothing)
pub type FrameMap = BTreeMap<String, Option<Rc<Frame>>>;

/// Turns a raw description plus resolved frames into a runtime skeleton
pub trait SkeletonParser {
    type Skeleton;

    fn parse(&self, frames: &FrameMap, raw: &SkeletonDescription) -> Self::Skeleton;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone (bones are declared parent-first)
    pub parent: Option<usize>,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub length: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub bone: Option<usize>,
    pub attachment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub slot: String,
    pub name: String,
    /// `None` renders as a missing attachment
    pub frame: Option<Rc<Frame>>,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub name: String,
    pub attachments: Vec<Attachment>,
}

/// Skeleton built by [`BasicSkeletonParser`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
    pub slots: Vec<Slot>,
    pub skins: Vec<Skin>,
}

impl Skeleton {
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn skin(&self, name: &str) -> Option<&Skin> {
        self.skins.iter().find(|s| s.name == name)
    }

    pub fn attachment(&self, skin: &str, slot: &str, name: &str) -> Option<&Attachment> {
        self.skin(skin)?
            .attachments
            .iter()
            .find(|a| a.slot == slot && a.name == name)
    }
}

/// Parser producing the plain [`Skeleton`] structure
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicSkeletonParser;

impl SkeletonParser for BasicSkeletonParser {
    type Skeleton = Skeleton;

    fn parse(&self, frames: &FrameMap, raw: &SkeletonDescription) -> Skeleton {
        let mut bones: Vec<Bone> = Vec::with_capacity(raw.bones.len());
        for desc in &raw.bones {
            let parent = desc
                .parent
                .as_deref()
                .and_then(|p| bones.iter().position(|b| b.name == p));
            bones.push(Bone {
                name: desc.name.clone(),
                parent,
                x: desc.x,
                y: desc.y,
                rotation: desc.rotation,
                length: desc.length,
            });
        }

        let slots = raw
            .slots
            .iter()
            .map(|desc| Slot {
                name: desc.name.clone(),
                bone: bones.iter().position(|b| b.name == desc.bone),
                attachment: desc.attachment.clone(),
            })
            .collect();

        let skins = raw
            .skins
            .iter()
            .map(|skin| Skin {
                name: skin.name.clone(),
                attachments: skin
                    .attachments
                    .iter()
                    .flat_map(|(slot, entries)| {
                        entries.iter().map(move |(key, att)| Attachment {
                            slot: slot.clone(),
                            name: key.clone(),
                            frame: frames.get(att.frame_id(key)).cloned().flatten(),
                            x: att.x,
                            y: att.y,
                            rotation: att.rotation,
                            scale_x: att.scale_x,
                            scale_y: att.scale_y,
                        })
                    })
                    .collect(),
            })
            .collect();

        Skeleton {
            bones,
            slots,
            skins,
        }
    }
}

/// Resolve every attachment frame of a description.
///
/// Each attachment whose frame the lookup cannot find is reported; the map
/// still records it (as `None`).
pub fn resolve_frames(
    skeleton: &str,
    raw: &SkeletonDescription,
    lookup: &dyn FrameLookup,
    diag: &dyn Diagnostics,
) -> FrameMap {
    let mut frames = FrameMap::new();
    for skin in &raw.skins {
        for (slot, entries) in &skin.attachments {
            for (key, att) in entries {
                let id = att.frame_id(key);
                let frame = lookup.get_frame(id);
                if frame.is_none() {
                    diag.warn(
                        WarnCode::MissingFrame,
                        &format!(
                            "skeleton '{}': skin '{}' slot '{}' attachment '{}' has no frame '{}'",
                            skeleton, skin.name, slot, key, id
                        ),
                    );
                }
                frames.insert(id.to_string(), frame);
            }
        }
    }
    frames
}

/// Parsed skeletons by name
#[derive(Debug)]
pub struct SpineCache<S> {
    skeletons: Repository<Rc<S>>,
}

impl<S> SpineCache<S> {
    pub fn new() -> Self {
        Self {
            skeletons: Repository::new(),
        }
    }

    /// Resolve frames, parse and cache a skeleton.
    /// Does nothing and returns `false` if `name` is already cached.
    pub fn add<P>(
        &mut self,
        name: &str,
        raw: &SkeletonDescription,
        lookup: &dyn FrameLookup,
        parser: &P,
        diag: &dyn Diagnostics,
    ) -> bool
    where
        P: SkeletonParser<Skeleton = S>,
    {
        if self.skeletons.has(name) {
            return false;
        }
        let frames = resolve_frames(name, raw, lookup, diag);
        let skeleton = parser.parse(&frames, raw);
        tracing::debug!(name, frames = frames.len(), "skeleton cached");
        self.skeletons.add(name, Rc::new(skeleton))
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.skeletons.remove(name)
    }

    pub fn get_skeleton(&self, name: &str) -> Option<Rc<S>> {
        self.skeletons.get(name).cloned()
    }

    pub fn names(&self) -> &[String] {
        self.skeletons.keys()
    }

    pub fn len(&self) -> usize {
        self.skeletons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skeletons.is_empty()
    }

    pub fn clear(&mut self) {
        self.skeletons.clear();
    }
}

impl<S> Default for SpineCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{FrameRegistry, GridDescriptor, TextureAtlas};
    use crate::diagnostics::RecordingDiagnostics;
    use std::cell::Cell;

    fn registry() -> FrameRegistry {
        let atlas = TextureAtlas::from_grid(&GridDescriptor {
            texture: "hero.png".to_string(),
            width: 64.0,
            height: 32.0,
            cell_width: 32.0,
            cell_height: 32.0,
            spacing: 0.0,
            margin: 0.0,
            prefix: "hero".to_string(),
            count: None,
        })
        .unwrap();
        let mut registry = FrameRegistry::new();
        registry.add_atlas(&atlas, &RecordingDiagnostics::new());
        registry
    }

    fn hero() -> SkeletonDescription {
        ron::from_str(
            r#"(
                bones: [(name: "root"), (name: "arm", parent: Some("root"), length: 12.0)],
                slots: [(name: "body", bone: "root"), (name: "hand", bone: "arm", attachment: Some("hero_1"))],
                skins: [(
                    name: "default",
                    attachments: {
                        "body": { "torso": (path: Some("hero_0")) },
                        "hand": { "hero_1": (x: 0.0), "glove": (path: Some("glove_red")) },
                    },
                )],
            )"#,
        )
        .unwrap()
    }

    #[test]
    fn test_add_resolves_frames() {
        let diag = RecordingDiagnostics::new();
        let mut cache: SpineCache<Skeleton> = SpineCache::new();
        assert!(cache.add("hero", &hero(), &registry(), &BasicSkeletonParser, &diag));

        let skeleton = cache.get_skeleton("hero").unwrap();
        assert_eq!(skeleton.bones[1].parent, Some(0));
        assert_eq!(skeleton.slots[1].bone, Some(1));

        let torso = skeleton.attachment("default", "body", "torso").unwrap();
        assert_eq!(torso.frame.as_ref().unwrap().name, "hero_0");
        // Key doubles as frame name when no path is given
        let hand = skeleton.attachment("default", "hand", "hero_1").unwrap();
        assert_eq!(hand.frame.as_ref().unwrap().name, "hero_1");
        assert_eq!(hand.scale_x, 1.0);
    }

    #[test]
    fn test_missing_frame_warns_but_caches() {
        let diag = RecordingDiagnostics::new();
        let mut cache: SpineCache<Skeleton> = SpineCache::new();
        assert!(cache.add("hero", &hero(), &registry(), &BasicSkeletonParser, &diag));

        assert_eq!(diag.count(WarnCode::MissingFrame), 1);
        assert!(diag.records()[0].1.contains("glove_red"));

        let glove = cache
            .get_skeleton("hero")
            .unwrap()
            .attachment("default", "hand", "glove")
            .cloned()
            .unwrap();
        assert!(glove.frame.is_none());
    }

    #[test]
    fn test_duplicate_name_is_noop() {
        struct CountingParser(Cell<usize>);
        impl SkeletonParser for CountingParser {
            type Skeleton = usize;
            fn parse(&self, frames: &FrameMap, _raw: &SkeletonDescription) -> usize {
                self.0.set(self.0.get() + 1);
                frames.len()
            }
        }

        let diag = RecordingDiagnostics::new();
        let parser = CountingParser(Cell::new(0));
        let mut cache: SpineCache<usize> = SpineCache::new();

        assert!(cache.add("hero", &hero(), &registry(), &parser, &diag));
        assert!(!cache.add("hero", &SkeletonDescription::default(), &registry(), &parser, &diag));
        assert_eq!(parser.0.get(), 1);
        assert_eq!(*cache.get_skeleton("hero").unwrap(), 3);
    }

    #[test]
    fn test_remove_and_names() {
        let diag = RecordingDiagnostics::new();
        let mut cache: SpineCache<Skeleton> = SpineCache::new();
        let frames = registry();
        cache.add("a", &hero(), &frames, &BasicSkeletonParser, &diag);
        cache.add("b", &hero(), &frames, &BasicSkeletonParser, &diag);
        assert_eq!(cache.names(), ["a", "b"]);

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert!(cache.get_skeleton("a").is_none());
        assert_eq!(cache.names(), ["b"]);
    }
}
