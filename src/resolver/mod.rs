//! Addon topology resolution.
//!
//! Works out which addon is being built, which other addons it links
//! against, where their library manifests are, and how their sources are
//! aliased.

pub mod alias;
pub mod manifests;
pub mod order;
pub mod topology;

pub use alias::AliasTable;
pub use manifests::{manifest_paths_for_directory, ManifestMatch};
pub use order::AddonGraph;
pub use topology::{resolve_primary_directory, TopologyCache};
