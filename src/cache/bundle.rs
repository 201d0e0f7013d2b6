//! Bundle cache
//!
//! Asset bundles (atlases + embedded blobs) and locale bundles (string tables)
//! keyed by bundle name. The two kinds live in separate repositories so an
//! asset bundle and a locale bundle may share a name.

use std::collections::BTreeMap;
use std::rc::Rc;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::atlas::{AtlasSource, TextureAtlas};
use crate::diagnostics::{Diagnostics, WarnCode};
use crate::repository::Repository;

/// Raw asset bundle as found in bundle files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetBundleDescriptor {
    pub name: String,
    #[serde(default)]
    pub atlases: Vec<AtlasSource>,
    /// Embedded binary payloads, base64 encoded
    #[serde(default)]
    pub blobs: BTreeMap<String, String>,
}

/// A processed asset bundle
#[derive(Debug, Clone, PartialEq)]
pub struct AssetBundle {
    pub name: String,
    pub atlases: Vec<TextureAtlas>,
    pub blobs: BTreeMap<String, Vec<u8>>,
}

impl AssetBundle {
    /// Process a descriptor. Atlases or blobs that fail to decode are skipped
    /// and reported; the bundle itself is always built.
    pub fn from_descriptor(desc: &AssetBundleDescriptor, diag: &dyn Diagnostics) -> Self {
        let mut atlases = Vec::with_capacity(desc.atlases.len());
        for source in &desc.atlases {
            match source.decompose() {
                Ok(atlas) => atlases.push(atlas),
                Err(e) => diag.warn(
                    WarnCode::InvalidBundleBlob,
                    &format!("bundle '{}': {}", desc.name, e),
                ),
            }
        }

        let mut blobs = BTreeMap::new();
        for (key, encoded) in &desc.blobs {
            match base64::engine::general_purpose::STANDARD.decode(encoded.trim()) {
                Ok(bytes) => {
                    blobs.insert(key.clone(), bytes);
                }
                Err(e) => diag.warn(
                    WarnCode::InvalidBundleBlob,
                    &format!("bundle '{}': blob '{}' is not base64: {}", desc.name, key, e),
                ),
            }
        }

        Self {
            name: desc.name.clone(),
            atlases,
            blobs,
        }
    }

    pub fn blob(&self, key: &str) -> Option<&[u8]> {
        self.blobs.get(key).map(|b| b.as_slice())
    }
}

/// Raw locale bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleBundleDescriptor {
    pub name: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
}

/// A string table for one locale
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleBundle {
    pub name: String,
    pub locale: String,
    strings: BTreeMap<String, String>,
}

impl LocaleBundle {
    pub fn from_descriptor(desc: &LocaleBundleDescriptor) -> Self {
        Self {
            name: desc.name.clone(),
            locale: desc.locale.clone(),
            strings: desc.strings.clone(),
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(|s| s.as_str())
    }

    /// Look up `key` and substitute positional `{0}`, `{1}`, ... placeholders
    ///
    /// The template is scanned once, so placeholders inside substituted
    /// arguments stay literal. Placeholders without a matching argument are
    /// kept as written.
    pub fn format(&self, key: &str, args: &[&str]) -> Option<String> {
        let template = self.text(key)?;
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let digits = after.find(|c: char| !c.is_ascii_digit()).unwrap_or(after.len());
            let arg = after[digits..]
                .starts_with('}')
                .then(|| after[..digits].parse::<usize>().ok())
                .flatten()
                .and_then(|i| args.get(i));
            match arg {
                Some(arg) => {
                    out.push_str(arg);
                    rest = &after[digits + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Some(out)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Asset and locale bundles by name
#[derive(Debug, Default)]
pub struct BundleCache {
    assets: Repository<Rc<AssetBundle>>,
    locales: Repository<Rc<LocaleBundle>>,
}

impl BundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process and store an asset bundle.
    /// Returns `None` without touching the cache if the name is taken.
    pub fn add_asset_bundle(
        &mut self,
        desc: &AssetBundleDescriptor,
        diag: &dyn Diagnostics,
    ) -> Option<Rc<AssetBundle>> {
        if self.assets.has(&desc.name) {
            return None;
        }
        let bundle = Rc::new(AssetBundle::from_descriptor(desc, diag));
        self.assets.add(desc.name.clone(), Rc::clone(&bundle));
        tracing::debug!(name = %desc.name, atlases = bundle.atlases.len(), "asset bundle added");
        Some(bundle)
    }

    pub fn get_asset_bundle(&self, name: &str) -> Option<Rc<AssetBundle>> {
        self.assets.get(name).cloned()
    }

    pub fn remove_asset_bundle(&mut self, name: &str) -> bool {
        self.assets.remove(name)
    }

    pub fn asset_bundle_names(&self) -> &[String] {
        self.assets.keys()
    }

    /// Store a locale bundle. Returns `None` if the name is taken.
    pub fn add_locale_bundle(&mut self, desc: &LocaleBundleDescriptor) -> Option<Rc<LocaleBundle>> {
        if self.locales.has(&desc.name) {
            return None;
        }
        let bundle = Rc::new(LocaleBundle::from_descriptor(desc));
        self.locales.add(desc.name.clone(), Rc::clone(&bundle));
        tracing::debug!(name = %desc.name, locale = %desc.locale, "locale bundle added");
        Some(bundle)
    }

    pub fn get_locale_bundle(&self, name: &str) -> Option<Rc<LocaleBundle>> {
        self.locales.get(name).cloned()
    }

    pub fn remove_locale_bundle(&mut self, name: &str) -> bool {
        self.locales.remove(name)
    }

    pub fn locale_bundle_names(&self) -> &[String] {
        self.locales.keys()
    }

    pub fn len(&self) -> usize {
        self.assets.len() + self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.locales.is_empty()
    }

    pub fn clear(&mut self) {
        self.assets.clear();
        self.locales.clear();
    }
}
