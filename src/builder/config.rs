//! Tool-ready bundle configurations.
//!
//! A `BundleConfiguration` describes one bundler pass for one group. It is
//! built fresh for every export group and every entry, and never mutated
//! afterwards; re-running a pass means building new configurations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::library_manifest::LibraryManifest;
use crate::resolver::alias::AliasTable;

/// Which pass a configuration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    /// Library-export pass: shared library plus manifest
    Export,
    /// Entry pass: shippable bundles linked against libraries
    Entry,
}

impl std::fmt::Display for PassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassKind::Export => write!(f, "export"),
            PassKind::Entry => write!(f, "entry"),
        }
    }
}

/// Bundler mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleMode {
    Production,
    Development,
}

impl BundleMode {
    /// Value for `NODE_ENV`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleMode::Production => "production",
            BundleMode::Development => "development",
        }
    }
}

/// Output location and naming of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOutput {
    /// Directory bundles are written to
    pub path: PathBuf,

    /// Bundle filename template
    pub filename: String,

    /// Lazy chunk filename template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<String>,

    /// Runtime request path of the output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
}

/// The library an export pass produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryOutput {
    /// Global symbol the library is exposed as
    pub name: String,

    /// Where the bundler writes the library manifest
    pub manifest_path: PathBuf,
}

/// A library manifest this pass links against.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestReference {
    pub path: PathBuf,
    pub manifest: LibraryManifest,
}

/// One resolved bundler pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleConfiguration {
    /// Unique name, also used for the rendered config file
    pub name: String,

    pub kind: PassKind,

    pub addon_key: String,

    /// Directory module ids are relative to
    pub context: PathBuf,

    /// Entry name -> ordered sources
    pub entry: BTreeMap<String, Vec<String>>,

    pub output: BundleOutput,

    /// Module namespaces for cross-addon imports
    pub aliases: AliasTable,

    /// Directories searched for bare module requests
    pub module_directories: Vec<PathBuf>,

    /// Library manifests linked as external references
    pub references: Vec<ManifestReference>,

    /// Set for export passes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<LibraryOutput>,

    pub mode: BundleMode,

    pub minify: bool,

    pub watch: bool,

    /// Dev server port, when served with hot reloading
    pub hot: Option<u16>,
}

/// Resolve an entry source against the addon directory.
///
/// Relative sources (`./`, `../`) become absolute paths; bare module
/// requests such as `react` or `@core/thing` are left for the bundler's
/// module resolution.
pub fn resolve_source(addon_dir: &Path, source: &str) -> String {
    if source.starts_with("./") || source.starts_with("../") {
        addon_dir.join(source).display().to_string()
    } else {
        source.to_string()
    }
}
