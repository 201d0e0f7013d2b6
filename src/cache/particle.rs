//! Particle cache
//!
//! Stores particle sources (a named description holding emitters and effect
//! sequences) and an index from each emitter/sequence name to the source that
//! defines it.
//!
//! Index entries and source data follow different rules on purpose:
//! - index entries are upserted, the last registration of a name wins
//! - source data is rejected when the source name is already taken
//!
//! Removing a source leaves its index entries in place. Callers resolving an
//! index entry must cope with the source data being gone.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::repository::Repository;

/// One emitter definition inside a particle source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterDef {
    pub name: String,
    /// Particles emitted per second (0 = burst only)
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: f32,
    #[serde(default)]
    pub speed_min: f32,
    #[serde(default)]
    pub speed_max: f32,
    /// Spread half-angle in radians
    #[serde(default)]
    pub spread: f32,
    /// Gravity multiplier (negative floats upward)
    #[serde(default)]
    pub gravity: f32,
    #[serde(default = "default_life")]
    pub life_min: f32,
    #[serde(default = "default_life")]
    pub life_max: f32,
    #[serde(default = "default_color")]
    pub color_start: [u8; 3],
    #[serde(default = "default_color")]
    pub color_end: [u8; 3],
    /// Frame drawn for each particle; plain quads when unset
    #[serde(default)]
    pub frame: Option<String>,
    #[serde(default = "default_size")]
    pub size: f32,
}

fn default_spawn_rate() -> f32 {
    10.0
}

fn default_life() -> f32 {
    1.0
}

fn default_color() -> [u8; 3] {
    [255, 255, 255]
}

fn default_size() -> f32 {
    1.0
}

impl EmitterDef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spawn_rate: default_spawn_rate(),
            speed_min: 0.0,
            speed_max: 0.0,
            spread: 0.0,
            gravity: 0.0,
            life_min: default_life(),
            life_max: default_life(),
            color_start: default_color(),
            color_end: default_color(),
            frame: None,
            size: default_size(),
        }
    }
}

/// One step of an effect sequence: run `emitter` after `delay` for `duration`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceStep {
    pub emitter: String,
    #[serde(default)]
    pub delay: f32,
    #[serde(default)]
    pub duration: f32,
}

/// A timed composition of emitters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceDef {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<SequenceStep>,
    #[serde(default)]
    pub looped: bool,
}

impl SequenceDef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            looped: false,
        }
    }
}

/// Raw particle source description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleData {
    #[serde(default)]
    pub emitters: Vec<EmitterDef>,
    #[serde(default)]
    pub sequences: Vec<SequenceDef>,
}

/// Index entry: which source defines an emitter or sequence name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParticleEntry {
    Emitter { name: String, source: String },
    Sequence { name: String, source: String },
}

/// Kind of item an index entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Particle,
    Sequence,
}

impl ParticleEntry {
    pub fn name(&self) -> &str {
        match self {
            ParticleEntry::Emitter { name, .. } | ParticleEntry::Sequence { name, .. } => name,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            ParticleEntry::Emitter { source, .. } | ParticleEntry::Sequence { source, .. } => {
                source
            }
        }
    }

    pub fn kind(&self) -> ParticleKind {
        match self {
            ParticleEntry::Emitter { .. } => ParticleKind::Particle,
            ParticleEntry::Sequence { .. } => ParticleKind::Sequence,
        }
    }
}

/// Particle sources plus the per-item index
#[derive(Debug, Default)]
pub struct ParticleCache {
    data: Repository<Rc<ParticleData>>,
    index: Repository<ParticleEntry>,
}

impl ParticleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a particle source.
    ///
    /// Every emitter and sequence is indexed first, unconditionally (replacing
    /// any entry of the same name). The data itself is then stored under
    /// `name`; the return value is whether that store succeeded.
    pub fn add(&mut self, name: &str, data: ParticleData) -> bool {
        for emitter in &data.emitters {
            self.index.upsert(
                emitter.name.clone(),
                ParticleEntry::Emitter {
                    name: emitter.name.clone(),
                    source: name.to_string(),
                },
            );
        }
        for sequence in &data.sequences {
            self.index.upsert(
                sequence.name.clone(),
                ParticleEntry::Sequence {
                    name: sequence.name.clone(),
                    source: name.to_string(),
                },
            );
        }

        let added = self.data.add(name, Rc::new(data));
        tracing::debug!(source = name, added, "particle source registered");
        added
    }

    /// Remove a source's data. Index entries pointing at it are kept.
    pub fn remove(&mut self, name: &str) -> bool {
        self.data.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Rc<ParticleData>> {
        self.data.get(name).cloned()
    }

    /// Look up the index entry for an emitter or sequence name
    pub fn get_particle(&self, item: &str) -> Option<&ParticleEntry> {
        self.index.get(item)
    }

    /// All indexed emitter and sequence names, in registration order
    pub fn names(&self) -> &[String] {
        self.index.keys()
    }

    /// Registered source names
    pub fn sources(&self) -> &[String] {
        self.data.keys()
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.index.clear();
    }
}
