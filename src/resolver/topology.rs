//! Addon topology: where the addon being built lives, and which other
//! addons take part in the core build process.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use crate::core::addon::{AddonDescriptor, BuildProcess, ADDON_MANIFEST};
use crate::core::errors::BuildError;
use crate::core::request::BuildRequest;
use crate::util::fs::{is_inside, list_subdirectories, normalize_path};

/// Top-level addon categories of an installation, in scan order.
pub const ADDON_CATEGORIES: [&str; 4] = ["applications", "plugins", "themes", "addons"];

/// Categories searched when resolving the primary addon by key.
const PRIMARY_CATEGORIES: [&str; 4] = ["applications", "addons", "themes", "plugins"];

/// Resolve the directory of the addon actually being built.
///
/// The first root directory is used when it lies inside the installation.
/// Otherwise the addon key is looked up under the known categories, which
/// also covers addons symlinked into the installation. A path inside the
/// installation is returned as is, without following symlinks, so it keeps
/// its place in the tree.
pub fn resolve_primary_directory(request: &BuildRequest) -> Result<PathBuf, BuildError> {
    let vanilla = normalize_path(&request.vanilla_directory);
    let mut searched = Vec::new();

    if let Some(root) = request.root_directories.first() {
        let lexical = !root.components().any(|c| c == Component::ParentDir);
        if lexical
            && root.is_dir()
            && (is_inside(root, &vanilla) || is_inside(root, &request.vanilla_directory))
        {
            return Ok(root.clone());
        }
        let candidate = normalize_path(root);
        searched.push(candidate.clone());
        if candidate.is_dir() && is_inside(&candidate, &vanilla) {
            return Ok(candidate);
        }
        tracing::debug!(
            "{} is outside {}, looking up `{}` by key",
            candidate.display(),
            vanilla.display(),
            request.addon_key
        );
    }

    if !request.addon_key.is_empty() {
        for category in PRIMARY_CATEGORIES {
            let candidate = vanilla.join(category).join(&request.addon_key);
            searched.push(candidate.clone());
            if candidate.is_dir() {
                return Ok(candidate);
            }
        }
    }

    Err(BuildError::AddonNotFound {
        addon_key: request.addon_key.clone(),
        vanilla_directory: vanilla,
        searched,
    })
}

/// Scan the installation for enabled addons using the core build process.
///
/// The installation root always comes first.
pub fn scan_core_build_addons(request: &BuildRequest) -> Result<Vec<PathBuf>, BuildError> {
    let vanilla = request.vanilla_directory();
    let mut dirs = vec![vanilla.to_path_buf()];

    for category in ADDON_CATEGORIES {
        for dir in list_subdirectories(&vanilla.join(category)) {
            if !dir.join(ADDON_MANIFEST).is_file() {
                continue;
            }
            let addon = AddonDescriptor::load(&dir)?;
            if addon.build.process == BuildProcess::Core && request.is_enabled(&addon.key) {
                tracing::debug!("core build addon `{}` at {}", addon.key, dir.display());
                dirs.push(dir);
            }
        }
    }

    Ok(dirs)
}

/// Memoized topology lookups for one build context.
///
/// Filled on first use and never invalidated: enabling another addon
/// needs a new context.
#[derive(Debug, Default)]
pub struct TopologyCache {
    core_build_addons: OnceLock<Vec<PathBuf>>,
}

impl TopologyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        TopologyCache::default()
    }

    /// All enabled core-build addon directories, installation root first.
    pub fn core_build_addons(&self, request: &BuildRequest) -> Result<&[PathBuf], BuildError> {
        if let Some(dirs) = self.core_build_addons.get() {
            return Ok(dirs);
        }
        let scanned = scan_core_build_addons(request)?;
        Ok(self.core_build_addons.get_or_init(|| scanned))
    }

    /// Whether the core build addons have been scanned.
    pub fn is_populated(&self) -> bool {
        self.core_build_addons.get().is_some()
    }
}

/// Source root of an addon: `src/scripts`, or the legacy `src/js`.
pub fn source_root(addon_dir: &Path) -> Option<PathBuf> {
    ["scripts", "js"]
        .iter()
        .map(|leaf| addon_dir.join("src").join(leaf))
        .find(|dir| dir.is_dir())
}
