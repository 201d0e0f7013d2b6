//! Engine configuration
//!
//! Read from a RON file. Every field has a default, so an empty `()` file is a
//! valid configuration.
//!
//! ```text
//! (
//!     asset_dir: "assets",
//!     manifest_file: "manifest.txt",
//!     log_filter: "bonnie_2d=debug",
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory assets are loaded from
pub const ASSETS_DIR: &str = "assets";

/// Manifest listing every asset file to load (directories can't be listed on WASM)
pub const MANIFEST_FILE: &str = "manifest.txt";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root directory for the asset loader
    pub asset_dir: PathBuf,
    /// Manifest file name, relative to `asset_dir`
    pub manifest_file: String,
    /// `tracing` filter directive used by `init_logging`
    pub log_filter: String,
    /// Idle item boxes kept for reuse
    pub view_pool_capacity: usize,
    /// Idle tweens kept for reuse
    pub tween_pool_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from(ASSETS_DIR),
            manifest_file: MANIFEST_FILE.to_string(),
            log_filter: "info".to_string(),
            view_pool_capacity: 64,
            tween_pool_capacity: 128,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Parse configuration from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest_file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "manifest_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full path of the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.asset_dir.join(&self.manifest_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_ron_str("()").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.manifest_path(), PathBuf::from("assets/manifest.txt"));
    }

    #[test]
    fn test_partial_config() {
        let config = EngineConfig::from_ron_str(
            r#"(asset_dir: "data", view_pool_capacity: 8)"#,
        )
        .unwrap();
        assert_eq!(config.asset_dir, PathBuf::from("data"));
        assert_eq!(config.view_pool_capacity, 8);
        assert_eq!(config.tween_pool_capacity, 128);
    }

    #[test]
    fn test_rejects_empty_manifest_name() {
        let err = EngineConfig::from_ron_str(r#"(manifest_file: "  ")"#).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ron");
        std::fs::write(&path, r#"(log_filter: "debug")"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.log_filter, "debug");

        let missing = EngineConfig::load(&dir.path().join("missing.ron"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
