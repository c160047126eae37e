//! AliasTable - module namespaces for cross-addon imports.
//!
//! Each participating addon's source root is reachable as `@<key>`, so
//! `import { x } from "@dashboard/x"` resolves into the dashboard addon.

use std::collections::btree_map::{BTreeMap, Entry};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::addon::AddonDescriptor;
use crate::core::errors::BuildError;
use crate::resolver::topology::{source_root, ADDON_CATEGORIES};
use crate::util::fs::{list_subdirectories, normalize_path};

/// Alias for the installation's shared library sources.
pub const LIBRARY_ALIAS: &str = "@library";

/// Module namespace -> absolute source directory.
///
/// The first candidate registered for a namespace wins; later ones are
/// skipped, so the result does not depend on filesystem scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: BTreeMap<String, PathBuf>,
}

impl AliasTable {
    /// Create an empty alias table.
    pub fn new() -> Self {
        AliasTable::default()
    }

    /// Register `alias` unless it is already taken. Returns whether it was added.
    pub fn insert(&mut self, alias: impl Into<String>, path: impl Into<PathBuf>) -> bool {
        match self.entries.entry(alias.into()) {
            Entry::Occupied(existing) => {
                tracing::debug!(
                    "alias `{}` already points at {}, skipping",
                    existing.key(),
                    existing.get().display()
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(path.into());
                true
            }
        }
    }

    /// Look up the directory behind an alias.
    pub fn get(&self, alias: &str) -> Option<&Path> {
        self.entries.get(alias).map(PathBuf::as_path)
    }

    /// Iterate over aliases in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(alias, path)| (alias.as_str(), path.as_path()))
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the alias table for a pass.
    ///
    /// Candidates are considered in this order, first one wins:
    /// 1. the installation's `library/src/scripts` as `@library`
    /// 2. `directories`, in the order given (roots, then required)
    /// 3. every addon under `applications`, `plugins`, `themes`, `addons`
    ///    (each sorted by name) whose key is in `always_include`
    ///
    /// Addons without a source root are skipped.
    pub fn build(
        vanilla_directory: &Path,
        directories: &[PathBuf],
        always_include: &[String],
    ) -> Result<Self, BuildError> {
        let mut table = AliasTable::new();

        let library = vanilla_directory.join("library").join("src").join("scripts");
        if library.is_dir() {
            table.insert(LIBRARY_ALIAS, library);
        }

        let vanilla = normalize_path(vanilla_directory);
        for dir in directories {
            // The installation root is not an addon.
            if normalize_path(dir) == vanilla {
                continue;
            }
            table.register(dir)?;
        }

        for category in ADDON_CATEGORIES {
            for dir in list_subdirectories(&vanilla_directory.join(category)) {
                let addon = AddonDescriptor::load_or_bare(&dir)?;
                if always_include
                    .iter()
                    .any(|key| key.eq_ignore_ascii_case(&addon.key))
                {
                    table.register_addon(&addon);
                }
            }
        }

        Ok(table)
    }

    fn register(&mut self, dir: &Path) -> Result<(), BuildError> {
        let addon = AddonDescriptor::load_or_bare(dir)?;
        self.register_addon(&addon);
        Ok(())
    }

    fn register_addon(&mut self, addon: &AddonDescriptor) {
        if let Some(root) = source_root(&addon.path) {
            self.insert(addon.alias(), root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InstallationFixture;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_first_insert_wins() {
        let mut table = AliasTable::new();
        assert!(table.insert("@core", "/first"));
        assert!(!table.insert("@core", "/second"));
        assert_eq!(table.get("@core"), Some(Path::new("/first")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_build_includes_directories_and_always_included() {
        let fixture = InstallationFixture::new();
        let dashboard = fixture.add_addon("applications", "dashboard", r#"{"key":"dashboard"}"#);
        fixture.write_file("applications/dashboard/src/scripts/index.js", "");
        let editor = fixture.add_addon("plugins", "rich-editor", r#"{"key":"rich-editor"}"#);
        fixture.write_file("plugins/rich-editor/src/scripts/index.js", "");
        fixture.add_addon("plugins", "unrelated", r#"{"key":"unrelated"}"#);
        fixture.write_file("plugins/unrelated/src/scripts/index.js", "");
        fixture.write_file("library/src/scripts/index.js", "");

        let table =
            AliasTable::build(fixture.root(), &[editor.clone()], &keys(&["dashboard"])).unwrap();

        assert_eq!(table.get("@rich-editor"), Some(editor.join("src/scripts").as_path()));
        assert_eq!(table.get("@dashboard"), Some(dashboard.join("src/scripts").as_path()));
        assert!(table.get(LIBRARY_ALIAS).is_some());
        assert!(table.get("@unrelated").is_none());
    }

    #[test]
    fn test_build_legacy_source_root() {
        let fixture = InstallationFixture::new();
        let old = fixture.add_addon("plugins", "old", r#"{"key":"old"}"#);
        fixture.write_file("plugins/old/src/js/index.js", "");

        let table = AliasTable::build(fixture.root(), &[old.clone()], &[]).unwrap();
        assert_eq!(table.get("@old"), Some(old.join("src/js").as_path()));
    }

    #[test]
    fn test_build_first_directory_wins_for_duplicate_keys() {
        let fixture = InstallationFixture::new();
        let theme = fixture.add_addon("themes", "shared", r#"{"key":"shared"}"#);
        fixture.write_file("themes/shared/src/scripts/index.js", "");
        let plugin = fixture.add_addon("plugins", "shared", r#"{"key":"shared"}"#);
        fixture.write_file("plugins/shared/src/scripts/index.js", "");

        let table = AliasTable::build(
            fixture.root(),
            &[theme.clone(), plugin.clone()],
            &keys(&["shared"]),
        )
        .unwrap();
        assert_eq!(table.get("@shared"), Some(theme.join("src/scripts").as_path()));

        let reversed =
            AliasTable::build(fixture.root(), &[plugin.clone(), theme], &keys(&["shared"])).unwrap();
        assert_eq!(reversed.get("@shared"), Some(plugin.join("src/scripts").as_path()));
    }

    #[test]
    fn test_build_scan_order_is_category_then_name() {
        let fixture = InstallationFixture::new();
        let app = fixture.add_addon("applications", "a", r#"{"key":"shared"}"#);
        fixture.write_file("applications/a/src/scripts/index.js", "");
        fixture.add_addon("plugins", "b", r#"{"key":"shared"}"#);
        fixture.write_file("plugins/b/src/scripts/index.js", "");

        let table = AliasTable::build(fixture.root(), &[], &keys(&["shared"])).unwrap();
        assert_eq!(table.get("@shared"), Some(app.join("src/scripts").as_path()));
    }

    #[test]
    fn test_build_skips_installation_root() {
        let fixture = InstallationFixture::new();
        fixture.write_file("src/scripts/index.js", "");

        let table =
            AliasTable::build(fixture.root(), &[fixture.root().to_path_buf()], &[]).unwrap();
        assert!(table.is_empty());
    }
}
