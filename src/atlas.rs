//! Texture atlas decomposition
//!
//! Splits an atlas texture into named frames with pixel rects and normalized
//! UVs. Two descriptor shapes are understood:
//!
//! - TexturePacker-style hashes (`frames` map + `meta` block), from RON or JSON
//! - Uniform grids (sprite sheets with fixed cell size)
//!
//! `FrameRegistry` collects the frames of every registered atlas and serves as
//! the frame lookup used by the skeleton cache and UI views.

use std::collections::BTreeMap;
use std::rc::Rc;

use macroquad::math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostics, WarnCode};
use crate::repository::Repository;

/// Error type for atlas decomposition
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AtlasError {
    #[error("atlas '{0}' has an empty texture size")]
    EmptyTexture(String),
    #[error("frame '{frame}' lies outside texture '{texture}'")]
    FrameOutOfBounds { texture: String, frame: String },
    #[error("grid for '{0}' has a zero cell size")]
    EmptyCell(String),
}

/// Pixel rectangle as written in descriptor files
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RectDesc {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeDesc {
    pub w: f32,
    pub h: f32,
}

/// One frame entry of a TexturePacker-style descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDesc {
    /// Sprite rect in the texture (unrotated size)
    pub frame: RectDesc,
    #[serde(default)]
    pub rotated: bool,
    #[serde(default)]
    pub trimmed: bool,
    /// Placement of the trimmed sprite inside its original bounds
    #[serde(default, rename = "spriteSourceSize", alias = "sprite_source_size")]
    pub sprite_source_size: Option<RectDesc>,
    /// Original (untrimmed) sprite size
    #[serde(default, rename = "sourceSize", alias = "source_size")]
    pub source_size: Option<SizeDesc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasMeta {
    /// Texture file / texture name the frames live in
    pub image: String,
    pub size: SizeDesc,
}

/// TexturePacker-style atlas description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    pub frames: BTreeMap<String, FrameDesc>,
    pub meta: AtlasMeta,
}

/// Uniform sprite-sheet description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDescriptor {
    pub texture: String,
    pub width: f32,
    pub height: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    /// Gap between cells
    #[serde(default)]
    pub spacing: f32,
    /// Border around the whole sheet
    #[serde(default)]
    pub margin: f32,
    /// Frames are named `{prefix}_{index}`
    pub prefix: String,
    /// Stop after this many cells (row-major); all cells if unset
    #[serde(default)]
    pub count: Option<usize>,
}

/// Either descriptor shape, as found in asset files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AtlasSource {
    Packed(AtlasDescriptor),
    Grid(GridDescriptor),
}

impl AtlasSource {
    pub fn decompose(&self) -> Result<TextureAtlas, AtlasError> {
        match self {
            AtlasSource::Packed(desc) => TextureAtlas::from_descriptor(desc),
            AtlasSource::Grid(grid) => TextureAtlas::from_grid(grid),
        }
    }
}

/// A named region of an atlas texture
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub name: String,
    /// Texture the frame lives in
    pub texture: String,
    /// Pixel rect occupied in the texture (rotated frames have w/h swapped)
    pub rect: Rect,
    /// `rect` normalized by the texture size
    pub uv: Rect,
    /// Stored rotated 90° clockwise in the texture
    pub rotated: bool,
    /// Offset of the trimmed sprite inside its original bounds
    pub offset: Vec2,
    /// Original sprite size before trimming
    pub source_size: Vec2,
}

impl Frame {
    /// Sprite size as drawn (undoing rotation)
    pub fn size(&self) -> Vec2 {
        if self.rotated {
            Vec2::new(self.rect.h, self.rect.w)
        } else {
            Vec2::new(self.rect.w, self.rect.h)
        }
    }
}

/// A texture decomposed into frames
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAtlas {
    pub texture: String,
    pub size: Vec2,
    frames: Vec<Rc<Frame>>,
}

impl TextureAtlas {
    /// Decompose a TexturePacker-style descriptor
    pub fn from_descriptor(desc: &AtlasDescriptor) -> Result<Self, AtlasError> {
        let texture = desc.meta.image.clone();
        let size = Vec2::new(desc.meta.size.w, desc.meta.size.h);
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(AtlasError::EmptyTexture(texture));
        }

        let mut frames = Vec::with_capacity(desc.frames.len());
        for (name, fd) in &desc.frames {
            let f = fd.frame;
            let rect = if fd.rotated {
                Rect::new(f.x, f.y, f.h, f.w)
            } else {
                Rect::new(f.x, f.y, f.w, f.h)
            };
            if rect.x < 0.0 || rect.y < 0.0 || rect.right() > size.x || rect.bottom() > size.y {
                return Err(AtlasError::FrameOutOfBounds {
                    texture,
                    frame: name.clone(),
                });
            }

            let offset = fd
                .sprite_source_size
                .map(|s| Vec2::new(s.x, s.y))
                .unwrap_or(Vec2::ZERO);
            let source_size = fd
                .source_size
                .map(|s| Vec2::new(s.w, s.h))
                .unwrap_or(Vec2::new(f.w, f.h));

            frames.push(Rc::new(Frame {
                name: name.clone(),
                texture: texture.clone(),
                rect,
                uv: normalize(rect, size),
                rotated: fd.rotated,
                offset,
                source_size,
            }));
        }

        Ok(Self {
            texture,
            size,
            frames,
        })
    }

    /// Cut a uniform grid into frames, row-major
    pub fn from_grid(grid: &GridDescriptor) -> Result<Self, AtlasError> {
        let size = Vec2::new(grid.width, grid.height);
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(AtlasError::EmptyTexture(grid.texture.clone()));
        }
        if grid.cell_width <= 0.0 || grid.cell_height <= 0.0 {
            return Err(AtlasError::EmptyCell(grid.texture.clone()));
        }

        let step_x = grid.cell_width + grid.spacing;
        let step_y = grid.cell_height + grid.spacing;
        let usable_w = grid.width - grid.margin * 2.0 + grid.spacing;
        let usable_h = grid.height - grid.margin * 2.0 + grid.spacing;
        let cols = (usable_w / step_x).floor().max(0.0) as usize;
        let rows = (usable_h / step_y).floor().max(0.0) as usize;
        let total = grid.count.map_or(cols * rows, |c| c.min(cols * rows));

        let frames = (0..total)
            .map(|index| {
                let col = index % cols;
                let row = index / cols;
                let rect = Rect::new(
                    grid.margin + col as f32 * step_x,
                    grid.margin + row as f32 * step_y,
                    grid.cell_width,
                    grid.cell_height,
                );
                Rc::new(Frame {
                    name: format!("{}_{}", grid.prefix, index),
                    texture: grid.texture.clone(),
                    rect,
                    uv: normalize(rect, size),
                    rotated: false,
                    offset: Vec2::ZERO,
                    source_size: Vec2::new(grid.cell_width, grid.cell_height),
                })
            })
            .collect();

        Ok(Self {
            texture: grid.texture.clone(),
            size,
            frames,
        })
    }

    pub fn frame(&self, name: &str) -> Option<&Rc<Frame>> {
        self.frames.iter().find(|f| f.name == name)
    }

    pub fn frames(&self) -> &[Rc<Frame>] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn normalize(rect: Rect, size: Vec2) -> Rect {
    Rect::new(rect.x / size.x, rect.y / size.y, rect.w / size.x, rect.h / size.y)
}

/// Resolves frame identifiers to frames
pub trait FrameLookup {
    fn get_frame(&self, id: &str) -> Option<Rc<Frame>>;
}

/// Every frame of every registered atlas, keyed by frame name
#[derive(Debug, Default)]
pub struct FrameRegistry {
    frames: Repository<Rc<Frame>>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register all frames of an atlas. The first registration of a frame name
    /// wins; later collisions are reported and skipped.
    pub fn add_atlas(&mut self, atlas: &TextureAtlas, diag: &dyn Diagnostics) -> usize {
        let mut added = 0;
        for frame in atlas.frames() {
            if self.frames.add(frame.name.clone(), Rc::clone(frame)) {
                added += 1;
            } else {
                diag.warn(
                    WarnCode::DuplicateFrame,
                    &format!(
                        "frame '{}' from '{}' is already registered",
                        frame.name, atlas.texture
                    ),
                );
            }
        }
        tracing::debug!(texture = %atlas.texture, added, "registered atlas frames");
        added
    }

    /// Drop every frame that belongs to `texture`. Returns the number removed.
    pub fn remove_texture(&mut self, texture: &str) -> usize {
        let doomed: Vec<String> = self
            .frames
            .iter()
            .filter(|(_, frame)| frame.texture == texture)
            .map(|(name, _)| name.to_string())
            .collect();
        for name in &doomed {
            self.frames.remove(name);
        }
        doomed.len()
    }

    pub fn has(&self, name: &str) -> bool {
        self.frames.has(name)
    }

    pub fn names(&self) -> &[String] {
        self.frames.keys()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl FrameLookup for FrameRegistry {
    fn get_frame(&self, id: &str) -> Option<Rc<Frame>> {
        self.frames.get(id).cloned()
    }
}
