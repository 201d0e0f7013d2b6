//! Asset tooling for BONNIE-2D
//!
//! Usage:
//!   cargo xtask gen-manifest [--dir assets]   # Write manifest.txt from the kind subdirectories
//!   cargo xtask check-assets [--dir assets]   # Load the manifest and report failures

use anyhow::{Context, Result};
use bonnie_2d::cache::{BasicSkeletonParser, Caches, Skeleton};
use bonnie_2d::config::{ASSETS_DIR, MANIFEST_FILE};
use bonnie_2d::loader::{AssetKind, AssetLoader, DirSource};
use bonnie_2d::{init_logging, TracingDiagnostics};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Asset tooling for BONNIE-2D")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan asset subdirectories and write the manifest (WASM can't list directories)
    GenManifest {
        /// Asset root, relative to the project root
        #[arg(long, default_value = ASSETS_DIR)]
        dir: PathBuf,
    },
    /// Load every manifest entry through the library and print the report
    CheckAssets {
        #[arg(long, default_value = ASSETS_DIR)]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::GenManifest { dir } => gen_manifest(&project_root()?.join(dir)),
        Commands::CheckAssets { dir } => check_assets(&project_root()?.join(dir)),
    }
}

/// Get the project root directory
fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask has no parent directory")
}

/// Files directly inside `dir`, sorted by name. Hidden files are skipped.
fn list_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| !name.starts_with('.'))
        .collect();
    files.sort();
    Ok(files)
}

/// Manifest text for an asset root: one `[section]` per non-empty kind directory
fn render_manifest(root: &Path) -> Result<String> {
    let mut manifest = String::new();
    for kind in AssetKind::ALL {
        let files = list_files(&root.join(kind.section()))?;
        if files.is_empty() {
            continue;
        }
        manifest.push_str(&format!("[{}]\n", kind.section()));
        for file in files {
            manifest.push_str(&format!("{}\n", file));
        }
        manifest.push('\n');
    }
    Ok(manifest)
}

fn gen_manifest(root: &Path) -> Result<()> {
    let manifest = render_manifest(root)?;
    let path = root.join(MANIFEST_FILE);
    std::fs::write(&path, manifest).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Manifest written: {}", path.display());
    Ok(())
}

fn check_assets(root: &Path) -> Result<()> {
    // Logging may already be set up by the environment; not fatal
    let _ = init_logging("warn");

    let loader = AssetLoader::new(DirSource::new(root));
    let mut caches: Caches<Skeleton> = Caches::new();
    let report = loader
        .load_manifest(MANIFEST_FILE, &mut caches, &BasicSkeletonParser, &TracingDiagnostics)
        .with_context(|| format!("Failed to load manifest in {}", root.display()))?;

    for path in &report.loaded {
        println!("  ok    {}", path);
    }
    for path in &report.duplicates {
        println!("  dup   {}", path);
    }
    for (path, err) in &report.failed {
        println!("  FAIL  {}: {}", path, err);
    }
    println!("{}", report);

    if !report.is_clean() {
        anyhow::bail!("{} asset(s) failed to load", report.failed.len());
    }
    Ok(())
}
