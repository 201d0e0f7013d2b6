//! Asset Loader
//!
//! Fetches asset files listed in a manifest and registers them into the
//! caches. The manifest groups files by kind, one section per kind:
//!
//! ```text
//! [atlases]
//! items.json
//!
//! [particles]
//! sparks.ron
//!
//! [skeletons]
//! hero.ron
//! ```
//!
//! Each file is looked up as `{section}/{file}` relative to the source root
//! and keyed by its file stem. Files may be plain text or brotli-compressed;
//! `.json` files parse as JSON, everything else as RON.
//!
//! A batch loads in kind priority order (atlases first, skeletons last) so
//! skeletons can resolve frames registered by the same batch. A file that
//! fails is reported and skipped; the rest of the batch still loads.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::atlas::{AtlasDescriptor, AtlasError, AtlasSource};
use crate::cache::{
    AssetBundleDescriptor, Caches, LocaleBundleDescriptor, ParticleData, SkeletonDescription,
    SkeletonParser,
};
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostics, WarnCode};

/// Error type for asset loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("asset '{0}' not found")]
    NotFound(String),
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("decompression of '{path}' failed: {message}")]
    Decompress { path: String, message: String },
    #[error("failed to parse '{path}': {message}")]
    Parse { path: String, message: String },
    #[error("bad atlas '{path}': {source}")]
    Atlas {
        path: String,
        #[source]
        source: AtlasError,
    },
}

/// Kinds of asset files a manifest can list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Atlas,
    AssetBundle,
    LocaleBundle,
    FontSizes,
    Particle,
    Skeleton,
}

impl AssetKind {
    /// Every kind, in load priority order
    pub const ALL: [AssetKind; 6] = [
        AssetKind::Atlas,
        AssetKind::AssetBundle,
        AssetKind::LocaleBundle,
        AssetKind::FontSizes,
        AssetKind::Particle,
        AssetKind::Skeleton,
    ];

    /// Manifest section name (also the subdirectory the files live in)
    pub fn section(&self) -> &'static str {
        match self {
            AssetKind::Atlas => "atlases",
            AssetKind::AssetBundle => "bundles",
            AssetKind::LocaleBundle => "locales",
            AssetKind::FontSizes => "fonts",
            AssetKind::Particle => "particles",
            AssetKind::Skeleton => "skeletons",
        }
    }

    pub fn from_section(section: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.section() == section)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

/// One file to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub kind: AssetKind,
    /// Cache key (file stem)
    pub name: String,
    /// Path relative to the source root
    pub path: String,
}

impl AssetRequest {
    pub fn new(kind: AssetKind, path: impl Into<String>) -> Self {
        let path = path.into();
        let file = path.rsplit('/').next().unwrap_or(&path);
        let name = file.split('.').next().unwrap_or(file).to_string();
        Self { kind, name, path }
    }
}

/// An ordered set of requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadBatch {
    requests: Vec<AssetRequest>,
}

impl LoadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: AssetRequest) {
        self.requests.push(request);
    }

    /// Order requests by kind priority, keeping file order within a kind
    pub fn sort_by_priority(&mut self) {
        self.requests.sort_by_key(|r| r.kind);
    }

    pub fn requests(&self) -> &[AssetRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Parse manifest text into a priority-ordered batch.
///
/// Blank lines and `#` comments are ignored. Files under an unknown section
/// (or before any section) are skipped with a warning.
pub fn parse_manifest(text: &str, diag: &dyn Diagnostics) -> LoadBatch {
    let mut batch = LoadBatch::new();
    let mut current: Option<AssetKind> = None;
    let mut section_name = String::new();
    let mut warned = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section_name = section.trim().to_string();
            current = AssetKind::from_section(&section_name);
            warned = false;
            continue;
        }
        match current {
            Some(kind) => batch.push(AssetRequest::new(kind, format!("{}/{}", kind.section(), line))),
            None => {
                if !warned {
                    let shown = if section_name.is_empty() { "(none)" } else { section_name.as_str() };
                    diag.warn(
                        WarnCode::UnknownManifestSection,
                        &format!("skipping files in manifest section '{}'", shown),
                    );
                    warned = true;
                }
            }
        }
    }

    batch.sort_by_priority();
    batch
}

/// Where asset bytes come from
pub trait AssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError>;
}

/// Files under a root directory
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let full = self.root.join(path);
        std::fs::read(&full).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(path.to_string())
            } else {
                LoadError::Io {
                    path: path.to_string(),
                    source: e,
                }
            }
        })
    }
}

/// In-memory files (tests, embedded assets)
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }
}

/// Decode a payload into text.
///
/// `.br` files are always brotli. Anything else is used as-is when it is
/// valid UTF-8 and decompressed as brotli otherwise.
pub fn decode_payload(path: &str, data: &[u8]) -> Result<String, LoadError> {
    if !path.ends_with(".br") {
        if let Ok(text) = std::str::from_utf8(data) {
            return Ok(text.to_string());
        }
    }

    let mut decompressed = Vec::new();
    brotli::BrotliDecompress(&mut std::io::Cursor::new(data), &mut decompressed).map_err(|e| {
        LoadError::Decompress {
            path: path.to_string(),
            message: e.to_string(),
        }
    })?;

    String::from_utf8(decompressed).map_err(|e| LoadError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Compress text the way `decode_payload` expects it
pub fn encode_payload(text: &str) -> Result<Vec<u8>, LoadError> {
    let mut compressed = Vec::new();
    brotli::BrotliCompress(
        &mut std::io::Cursor::new(text.as_bytes()),
        &mut compressed,
        &brotli::enc::BrotliEncoderParams {
            quality: 6,
            lgwin: 22,
            ..Default::default()
        },
    )
    .map_err(|e| LoadError::Decompress {
        path: String::new(),
        message: format!("compression failed: {}", e),
    })?;
    Ok(compressed)
}

fn is_json(path: &str) -> bool {
    path.ends_with(".json") || path.ends_with(".json.br")
}

fn parse_as<T: DeserializeOwned>(path: &str, text: &str) -> Result<T, LoadError> {
    let result = if is_json(path) {
        serde_json::from_str(text).map_err(|e| e.to_string())
    } else {
        ron::from_str(text).map_err(|e| e.to_string())
    };
    result.map_err(|message| LoadError::Parse {
        path: path.to_string(),
        message,
    })
}

/// Baked font sizes per family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontSizeList {
    #[serde(default)]
    pub fonts: BTreeMap<String, Vec<u32>>,
}

/// Outcome of a batch
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Paths registered into a cache
    pub loaded: Vec<String>,
    /// Paths rejected because the name was already cached
    pub duplicates: Vec<String>,
    pub failed: Vec<(String, LoadError)>,
}

impl LoadReport {
    /// True when nothing failed
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loaded, {} duplicate, {} failed",
            self.loaded.len(),
            self.duplicates.len(),
            self.failed.len()
        )
    }
}

enum Registered {
    Added,
    Duplicate,
}

pub struct AssetLoader<S: AssetSource> {
    source: S,
}

impl AssetLoader<DirSource> {
    /// Loader reading from the configured asset directory
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(DirSource::new(config.asset_dir.clone()))
    }
}

impl<S: AssetSource> AssetLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch a manifest through the source and load everything it lists.
    /// Only a missing or unreadable manifest is an error.
    pub fn load_manifest<P: SkeletonParser>(
        &self,
        manifest: &str,
        caches: &mut Caches<P::Skeleton>,
        parser: &P,
        diag: &dyn Diagnostics,
    ) -> Result<LoadReport, LoadError> {
        let bytes = self.source.fetch(manifest)?;
        let text = decode_payload(manifest, &bytes)?;
        let batch = parse_manifest(&text, diag);
        Ok(self.load_batch(&batch, caches, parser, diag))
    }

    /// Load every request in batch order
    pub fn load_batch<P: SkeletonParser>(
        &self,
        batch: &LoadBatch,
        caches: &mut Caches<P::Skeleton>,
        parser: &P,
        diag: &dyn Diagnostics,
    ) -> LoadReport {
        let mut report = LoadReport::default();
        for request in batch.requests() {
            match self.load_one(request, caches, parser, diag) {
                Ok(Registered::Added) => report.loaded.push(request.path.clone()),
                Ok(Registered::Duplicate) => report.duplicates.push(request.path.clone()),
                Err(e) => {
                    diag.warn(WarnCode::AssetLoadFailed, &e.to_string());
                    report.failed.push((request.path.clone(), e));
                }
            }
        }
        tracing::info!(
            loaded = report.loaded.len(),
            duplicates = report.duplicates.len(),
            failed = report.failed.len(),
            "asset batch loaded"
        );
        report
    }

    fn load_one<P: SkeletonParser>(
        &self,
        request: &AssetRequest,
        caches: &mut Caches<P::Skeleton>,
        parser: &P,
        diag: &dyn Diagnostics,
    ) -> Result<Registered, LoadError> {
        let path = request.path.as_str();
        let bytes = self.source.fetch(path)?;
        let text = decode_payload(path, &bytes)?;

        let added = match request.kind {
            AssetKind::Atlas => {
                let source = if is_json(path) {
                    AtlasSource::Packed(parse_as::<AtlasDescriptor>(path, &text)?)
                } else {
                    parse_as::<AtlasSource>(path, &text)?
                };
                let atlas = source.decompose().map_err(|e| LoadError::Atlas {
                    path: path.to_string(),
                    source: e,
                })?;
                caches.frames.add_atlas(&atlas, diag);
                true
            }
            AssetKind::AssetBundle => {
                let desc: AssetBundleDescriptor = parse_as(path, &text)?;
                match caches.bundles.add_asset_bundle(&desc, diag) {
                    Some(bundle) => {
                        for atlas in &bundle.atlases {
                            caches.frames.add_atlas(atlas, diag);
                        }
                        true
                    }
                    None => false,
                }
            }
            AssetKind::LocaleBundle => {
                let desc: LocaleBundleDescriptor = parse_as(path, &text)?;
                caches.bundles.add_locale_bundle(&desc).is_some()
            }
            AssetKind::FontSizes => {
                let list: FontSizeList = parse_as(path, &text)?;
                for (family, sizes) in &list.fonts {
                    for &size in sizes {
                        caches.fonts.add_font_size(family, size);
                    }
                }
                true
            }
            AssetKind::Particle => {
                let data: ParticleData = parse_as(path, &text)?;
                caches.particles.add(&request.name, data)
            }
            AssetKind::Skeleton => {
                let raw: SkeletonDescription = parse_as(path, &text)?;
                caches
                    .skeletons
                    .add(&request.name, &raw, &caches.frames, parser, diag)
            }
        };

        tracing::trace!(path, kind = %request.kind, added, "asset processed");
        Ok(if added {
            Registered::Added
        } else {
            Registered::Duplicate
        })
    }
}
