//! Implementation of `addon-build clean`.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::context::{BuildContext, BuildSettings};
use crate::builder::webpack::CACHE_DIR;
use crate::core::library_manifest::MANIFESTS_DIR;
use crate::core::request::BuildRequest;
use crate::util::fs::remove_dir_all_if_exists;

/// Result of the clean command.
#[derive(Debug, Default)]
pub struct CleanResult {
    /// Directories that were removed
    pub removed: Vec<PathBuf>,
}

/// Remove an addon's library manifests, library bundles and rendered
/// bundler configurations.
///
/// Entry bundles are left alone: their folders may also hold files the
/// addon ships by hand.
pub fn clean(request: &BuildRequest) -> Result<CleanResult> {
    let ctx = BuildContext::new(request, BuildSettings::default())?;
    let addon_dir = &ctx.primary_directory;

    let targets = [
        addon_dir.join(MANIFESTS_DIR),
        addon_dir.join("js").join("webpack"),
        ctx.vanilla_directory.join(CACHE_DIR).join(ctx.addon_key()),
    ];

    let mut result = CleanResult::default();
    for target in targets {
        if remove_dir_all_if_exists(&target)? {
            tracing::debug!("removed {}", target.display());
            result.removed.push(target);
        }
    }
    Ok(result)
}
