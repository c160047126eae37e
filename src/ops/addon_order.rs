//! Implementation of `addon-build order`.
//!
//! Nothing stops an addon from being built before the addons it requires;
//! its entries would then link stale or missing libraries. This computes a
//! safe order for building a whole installation.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::addon::AddonDescriptor;
use crate::core::request::BuildRequest;
use crate::resolver::order::AddonGraph;
use crate::resolver::topology::scan_core_build_addons;
use crate::util::fs::normalize_path;

/// One addon in build order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedAddon {
    pub key: String,
    pub path: PathBuf,
    /// Keys of required addons that are part of the order
    pub requires: Vec<String>,
}

/// Result of the order command.
#[derive(Debug, Default)]
pub struct OrderResult {
    pub addons: Vec<OrderedAddon>,
    /// Version requirement problems
    pub warnings: Vec<String>,
}

/// Order the enabled core-build addons of an installation, required
/// addons first.
pub fn addon_order(vanilla_directory: &Path, enabled_addon_keys: &[String]) -> Result<OrderResult> {
    let request = BuildRequest::new("", vanilla_directory)
        .with_enabled_addons(enabled_addon_keys.to_vec());
    let root = normalize_path(vanilla_directory);

    let descriptors = scan_core_build_addons(&request)?
        .iter()
        .filter(|dir| normalize_path(dir) != root)
        .map(|dir| AddonDescriptor::load(dir))
        .collect::<Result<Vec<_>, _>>()?;

    let graph = AddonGraph::new(&descriptors);
    for warning in graph.warnings() {
        tracing::warn!("{}", warning);
    }

    let addons = graph
        .build_order()?
        .into_iter()
        .map(|addon| OrderedAddon {
            key: addon.key.clone(),
            path: addon.path.clone(),
            requires: graph
                .requirements(&addon.key)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect();

    Ok(OrderResult {
        addons,
        warnings: graph.warnings().to_vec(),
    })
}
