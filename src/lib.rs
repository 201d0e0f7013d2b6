//! BONNIE-2D: asset caches and pooled views for 2D games
//!
//! - Keyed repositories with stable insertion order
//! - Bundle, particle, skeleton and font-size caches
//! - Reference-counted particle bundles on top of an external runtime
//! - Pooled UI views with a reuse / clear-data lifecycle
//! - Manifest-driven asset loading (plain or brotli, RON or JSON)

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod atlas;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod easing;
pub mod engine;
pub mod event;
pub mod loader;
pub mod particle;
pub mod pool;
pub mod repository;
pub mod ui;

pub use atlas::{Frame, FrameLookup, FrameRegistry, TextureAtlas};
pub use cache::{BundleCache, Caches, FontSizeCache, ParticleCache, SpineCache};
pub use config::{ConfigError, EngineConfig};
pub use diagnostics::{init_logging, Diagnostics, RecordingDiagnostics, TracingDiagnostics, WarnCode};
pub use engine::Engine;
pub use loader::{AssetLoader, LoadError, LoadReport};
pub use particle::{ParticleRuntime, ParticleSystem};
pub use pool::{Pool, Poolable};
pub use repository::Repository;
