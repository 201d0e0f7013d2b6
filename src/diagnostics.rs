//! Diagnostics
//!
//! Non-fatal warnings about degraded-but-successful operations (a skeleton
//! attachment whose frame is missing, a bundle blob that failed to decode).
//! Warnings never change control flow; they only leave the call through the
//! sink.

use std::cell::RefCell;
use std::fmt;

/// Warning categories reported through a [`Diagnostics`] sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarnCode {
    /// A skeleton attachment references a frame the lookup does not know
    MissingFrame,
    /// An embedded bundle blob is not valid base64
    InvalidBundleBlob,
    /// An atlas frame name was already registered by another atlas
    DuplicateFrame,
    /// An asset in a load batch could not be fetched, decoded or parsed
    AssetLoadFailed,
    /// A manifest section header names no known asset kind
    UnknownManifestSection,
}

impl WarnCode {
    /// Stable identifier used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            WarnCode::MissingFrame => "missing_frame",
            WarnCode::InvalidBundleBlob => "invalid_bundle_blob",
            WarnCode::DuplicateFrame => "duplicate_frame",
            WarnCode::AssetLoadFailed => "asset_load_failed",
            WarnCode::UnknownManifestSection => "unknown_manifest_section",
        }
    }
}

impl fmt::Display for WarnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget warning sink
pub trait Diagnostics {
    fn warn(&self, code: WarnCode, detail: &str);
}

/// Forwards warnings to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, code: WarnCode, detail: &str) {
        tracing::warn!(code = code.as_str(), "{}", detail);
    }
}

/// Keeps every warning in memory, in the order reported
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: RefCell<Vec<(WarnCode, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded warnings
    pub fn records(&self) -> Vec<(WarnCode, String)> {
        self.records.borrow().clone()
    }

    /// Number of warnings recorded with the given code
    pub fn count(&self, code: WarnCode) -> usize {
        self.records.borrow().iter().filter(|(c, _)| *c == code).count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn warn(&self, code: WarnCode, detail: &str) {
        self.records.borrow_mut().push((code, detail.to_string()));
    }
}

/// Install a global `tracing` subscriber writing formatted events to stderr.
///
/// `filter` uses `EnvFilter` syntax (e.g. `"info"` or `"bonnie_2d=debug"`);
/// `RUST_LOG` takes precedence when set. Fails if a subscriber is already
/// installed.
pub fn init_logging(filter: &str) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

/// Error type for logging setup
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_keeps_order() {
        let diag = RecordingDiagnostics::new();
        diag.warn(WarnCode::MissingFrame, "arm");
        diag.warn(WarnCode::DuplicateFrame, "coin");
        diag.warn(WarnCode::MissingFrame, "leg");

        assert_eq!(diag.count(WarnCode::MissingFrame), 2);
        let records = diag.records();
        assert_eq!(records[1], (WarnCode::DuplicateFrame, "coin".to_string()));
        assert_eq!(records[2].1, "leg");
    }

    #[test]
    fn test_tracing_sink_without_subscriber() {
        // No subscriber installed: the event is simply discarded
        TracingDiagnostics.warn(WarnCode::AssetLoadFailed, "nothing listens");
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            WarnCode::MissingFrame,
            WarnCode::InvalidBundleBlob,
            WarnCode::DuplicateFrame,
            WarnCode::AssetLoadFailed,
            WarnCode::UnknownManifestSection,
        ];
        let mut names: Vec<_> = codes.iter().map(|c| c.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), codes.len());
    }
}
