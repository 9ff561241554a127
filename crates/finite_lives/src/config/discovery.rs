use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

use super::store::ConfigStore;
use super::types::ConfigError;

pub const CONFIG_ASSET_SUFFIX: &str = "finitelives";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Xml,
    Texture,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModAsset {
    pub path_virtual: String,
    pub cached_path: PathBuf,
    pub kind: AssetKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoverySummary {
    pub files_parsed: usize,
    pub files_failed: usize,
    pub chapters_loaded: usize,
}

/// The registry lock is held only while collecting candidates.
pub fn load_from_registry(
    store: &mut ConfigStore,
    registry: &Mutex<BTreeMap<String, ModAsset>>,
) -> DiscoverySummary {
    let candidates = {
        let assets = match registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut visited = HashSet::<PathBuf>::new();
        let mut candidates = Vec::<PathBuf>::new();
        for asset in assets.values() {
            if !is_config_asset(asset) || !visited.insert(asset.cached_path.clone()) {
                continue;
            }
            info!(
                path_virtual = %asset.path_virtual,
                cached_path = %asset.cached_path.display(),
                "config_asset_found"
            );
            candidates.push(asset.cached_path.clone());
        }
        candidates
    };

    let mut summary = DiscoverySummary::default();
    for path in candidates {
        match store.parse_file(&path) {
            Ok(report) => {
                summary.files_parsed += 1;
                summary.chapters_loaded += report.chapters_added.len();
            }
            Err(error) => {
                summary.files_failed += 1;
                warn!(path = %path.display(), error = %error, "config_source_skipped");
            }
        }
    }

    info!(
        files_parsed = summary.files_parsed,
        files_failed = summary.files_failed,
        chapters_loaded = summary.chapters_loaded,
        total_chapters = store.len(),
        "config_discovery_summary"
    );
    summary
}

fn is_config_asset(asset: &ModAsset) -> bool {
    asset.kind == AssetKind::Xml && asset.path_virtual.ends_with(CONFIG_ASSET_SUFFIX)
}

pub fn registry_from_dir(root: &Path) -> Result<BTreeMap<String, ModAsset>, ConfigError> {
    let mut registry = BTreeMap::<String, ModAsset>::new();
    collect_recursive(root, root, &mut registry)?;
    Ok(registry)
}

fn collect_recursive(
    root: &Path,
    current: &Path,
    registry: &mut BTreeMap<String, ModAsset>,
) -> Result<(), ConfigError> {
    let entries = fs::read_dir(current).map_err(|source| ConfigError::ReadDir {
        path: current.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::ReadDir {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(root, &path, registry)?;
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        let path_virtual = normalize_rel_path(&rel.with_extension(""));
        let kind = asset_kind_for(&path);
        registry.insert(
            path_virtual.clone(),
            ModAsset {
                path_virtual,
                cached_path: path,
                kind,
            },
        );
    }
    Ok(())
}

fn asset_kind_for(path: &Path) -> AssetKind {
    let ext = path.extension().and_then(|ext| ext.to_str());
    match ext {
        Some(ext) if ext.eq_ignore_ascii_case("xml") => AssetKind::Xml,
        Some(ext) if ext.eq_ignore_ascii_case("png") => AssetKind::Texture,
        _ => AssetKind::Other,
    }
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}
