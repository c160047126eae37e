//! Library manifests written by the export pass.
//!
//! The bundler owns the content schema. It has at least a `name` (the
//! global library symbol) and a `content` map of module id to metadata.
//! Anything else is carried through untouched.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::BuildError;

/// Directory inside an addon that holds its library manifests.
pub const MANIFESTS_DIR: &str = "manifests";

/// Suffix every library manifest filename ends with.
pub const MANIFEST_SUFFIX: &str = "manifest.json";

/// A library manifest as written by the bundler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryManifest {
    /// Global symbol the library is exposed as
    pub name: String,

    /// Module id -> module metadata
    #[serde(default)]
    pub content: Map<String, Value>,

    /// Fields owned by the bundler
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LibraryManifest {
    /// Read and parse a library manifest.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| BuildError::LibraryManifestRead {
                path: path.to_path_buf(),
                source,
            })?;

        serde_json::from_str(&content).map_err(|source| BuildError::LibraryManifestCorrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether the library provides the given module id.
    pub fn provides(&self, module_id: &str) -> bool {
        self.content.contains_key(module_id)
    }
}

/// Where the export pass writes the manifest of `group` for the addon at `addon_dir`.
pub fn manifest_path(addon_dir: &Path, group: &str) -> PathBuf {
    addon_dir
        .join(MANIFESTS_DIR)
        .join(format!("{}-{}", group, MANIFEST_SUFFIX))
}
