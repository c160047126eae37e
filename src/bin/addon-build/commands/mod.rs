//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod order;

use std::path::{Path, PathBuf};

use anyhow::Result;

use addon_build::core::AddonDescriptor;
use addon_build::util::GlobalContext;

/// Make a CLI path absolute against the working directory.
pub fn absolute(gctx: &GlobalContext, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        gctx.cwd().join(path)
    }
}

/// Work out the addon key and root directories of a command.
///
/// Without root directories the working directory is the addon; without a
/// key, the key comes from the primary addon's addon.json.
pub fn addon_target(
    gctx: &GlobalContext,
    addon_key: Option<String>,
    root_directories: &[PathBuf],
) -> Result<(String, Vec<PathBuf>)> {
    let mut roots: Vec<PathBuf> = root_directories
        .iter()
        .map(|dir| absolute(gctx, dir))
        .collect();

    let key = match addon_key {
        Some(key) => key,
        None => {
            if roots.is_empty() {
                roots.push(gctx.cwd().to_path_buf());
            }
            AddonDescriptor::load_or_bare(&roots[0])?.key
        }
    };

    Ok((key, roots))
}

/// Enabled addon keys: configured ones plus the ones passed on the command line.
pub fn enabled_keys(configured: &[String], extra: Vec<String>) -> Vec<String> {
    let mut keys = configured.to_vec();
    for key in extra {
        if !keys.iter().any(|k| k.eq_ignore_ascii_case(&key)) {
            keys.push(key);
        }
    }
    keys
}
