//! Library manifest discovery and entry matching.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use walkdir::WalkDir;

use crate::core::library_manifest::{MANIFESTS_DIR, MANIFEST_SUFFIX};

/// Lazily list every library manifest under `directory/manifests/`.
///
/// The iterator is finite and single-pass. A missing `manifests/`
/// directory yields nothing; a fresh checkout has not built any
/// libraries yet. Symlinks are followed. Walk errors, such as broken or
/// looping links, are logged and skipped.
pub fn manifest_paths_for_directory(directory: &Path) -> impl Iterator<Item = PathBuf> {
    let root = directory.join(MANIFESTS_DIR);
    let present = root.is_dir();
    if !present {
        tracing::debug!("no manifests directory at {}", root.display());
    }

    WalkDir::new(&root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .take_while(move |_| present)
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("manifest search failed: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(MANIFEST_SUFFIX))
        .map(|entry| entry.into_path())
}

/// How a library manifest is matched against an entry or export group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestMatch {
    /// The normalized key appears anywhere in the manifest filename.
    ///
    /// Loose: `admin` also matches `superadmin-manifest.json`.
    #[default]
    Substring,
    /// The normalized key equals the manifest filename without its suffix.
    Exact,
}

impl fmt::Display for ManifestMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestMatch::Substring => write!(f, "substring"),
            ManifestMatch::Exact => write!(f, "exact"),
        }
    }
}

impl FromStr for ManifestMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "substring" => Ok(ManifestMatch::Substring),
            "exact" => Ok(ManifestMatch::Exact),
            _ => Err(format!(
                "invalid manifest match '{}'; expected 'substring' or 'exact'",
                s
            )),
        }
    }
}

/// Normalize a group key for manifest lookup.
///
/// Removes the first literal `bootstrap`, then the first hyphen, so
/// `bootstrap-admin` looks up `admin`.
pub fn lookup_key(key: &str) -> String {
    key.replacen("bootstrap", "", 1).replacen('-', "", 1)
}

impl ManifestMatch {
    /// Whether the manifest at `manifest_path` may be linked into group `key`.
    pub fn matches(&self, key: &str, manifest_path: &Path) -> bool {
        let lookup = lookup_key(key);
        let file_name = match manifest_path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return false,
        };

        match self {
            ManifestMatch::Substring => file_name.contains(lookup.as_str()),
            ManifestMatch::Exact => {
                let stem = file_name
                    .strip_suffix(MANIFEST_SUFFIX)
                    .map(|s| s.trim_end_matches(['-', '.']))
                    .unwrap_or(&file_name);
                stem == lookup
            }
        }
    }
}
