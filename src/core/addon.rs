//! addon.json parsing and the addon descriptor.
//!
//! Every addon carries an `addon.json` at its root. Only the parts the
//! build needs are modeled here: the key, the declared version, the
//! `build` block and the `require` map.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::entry::{entry_groups, EntryGroups};
use crate::core::errors::BuildError;

/// Name of the per-addon manifest file.
pub const ADDON_MANIFEST: &str = "addon.json";

/// Build process an addon declares.
///
/// All processes share one resolver. The process only changes output
/// filename templates and whether output is minified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildProcess {
    /// Shared-library aware build (exports + entries)
    #[serde(rename = "core")]
    Core,
    /// First versioned build process
    #[serde(rename = "v1", alias = "1.0")]
    V1,
    /// Pre-versioned build process
    #[default]
    #[serde(rename = "legacy")]
    Legacy,
}

impl BuildProcess {
    /// Filename template for an entry bundle of `addon_key`.
    pub fn entry_filename(&self, addon_key: &str) -> String {
        match self {
            BuildProcess::Core => format!("{}-[name].min.js", addon_key),
            BuildProcess::V1 => format!("{}-[name].js", addon_key),
            BuildProcess::Legacy => "[name].js".to_string(),
        }
    }

    /// Whether production bundles are minified.
    pub fn minify(&self) -> bool {
        !matches!(self, BuildProcess::Legacy)
    }
}

impl fmt::Display for BuildProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildProcess::Core => write!(f, "core"),
            BuildProcess::V1 => write!(f, "v1"),
            BuildProcess::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for BuildProcess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(BuildProcess::Core),
            "v1" | "1.0" => Ok(BuildProcess::V1),
            "legacy" => Ok(BuildProcess::Legacy),
            _ => Err(format!(
                "unknown build process '{}'; expected 'core', 'v1' or 'legacy'",
                s
            )),
        }
    }
}

/// Preferred stylesheet tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CssTool {
    Less,
    #[default]
    Scss,
}

/// The `build` block of addon.json.
///
/// `entries` and `exports` stay raw until validated, since an invalid
/// shape means "nothing to build" rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddonBuild {
    #[serde(default)]
    pub process: BuildProcess,

    #[serde(default, rename = "cssTool")]
    pub css_tool: CssTool,

    #[serde(default)]
    pub entries: Value,

    #[serde(default)]
    pub exports: Value,
}

/// Raw addon.json as deserialized.
#[derive(Debug, Deserialize)]
struct RawAddon {
    #[serde(default)]
    key: Option<String>,

    #[serde(default)]
    version: Option<String>,

    #[serde(default)]
    build: AddonBuild,

    #[serde(default)]
    require: BTreeMap<String, String>,
}

/// An addon as read from its directory.
#[derive(Debug, Clone)]
pub struct AddonDescriptor {
    /// Addon key
    pub key: String,

    /// Addon directory
    pub path: PathBuf,

    /// Declared version
    pub version: Option<String>,

    /// Build configuration
    pub build: AddonBuild,

    /// Required addons (key -> version requirement)
    pub require: BTreeMap<String, String>,
}

impl AddonDescriptor {
    /// Load the descriptor for the addon at `dir`.
    pub fn load(dir: &Path) -> Result<Self, BuildError> {
        let manifest_path = dir.join(ADDON_MANIFEST);
        let content =
            std::fs::read_to_string(&manifest_path).map_err(|source| BuildError::ManifestRead {
                path: manifest_path.clone(),
                source,
            })?;

        Self::parse(&content, dir).map_err(|source| BuildError::ManifestParse {
            path: manifest_path,
            source,
        })
    }

    /// Load the descriptor, or describe a manifest-less directory.
    ///
    /// A directory without addon.json is an addon with nothing to build.
    pub fn load_or_bare(dir: &Path) -> Result<Self, BuildError> {
        if dir.join(ADDON_MANIFEST).is_file() {
            Self::load(dir)
        } else {
            Ok(Self::bare(dir))
        }
    }

    /// Parse addon.json content for the addon at `dir`.
    pub fn parse(content: &str, dir: &Path) -> Result<Self, serde_json::Error> {
        let raw: RawAddon = serde_json::from_str(content)?;
        let key = raw.key.unwrap_or_else(|| key_from_dir(dir));

        Ok(AddonDescriptor {
            key,
            path: dir.to_path_buf(),
            version: raw.version,
            build: raw.build,
            require: raw.require,
        })
    }

    fn bare(dir: &Path) -> Self {
        AddonDescriptor {
            key: key_from_dir(dir),
            path: dir.to_path_buf(),
            version: None,
            build: AddonBuild::default(),
            require: BTreeMap::new(),
        }
    }

    /// Validated export groups, if any.
    pub fn export_groups(&self) -> Option<EntryGroups> {
        entry_groups(&self.build.exports)
    }

    /// Validated entry groups, if any.
    pub fn entry_groups(&self) -> Option<EntryGroups> {
        entry_groups(&self.build.entries)
    }

    /// Module namespace this addon's sources are aliased under.
    pub fn alias(&self) -> String {
        format!("@{}", self.key.to_lowercase())
    }
}

fn key_from_dir(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
