//! Installation fixtures.
//!
//! An `InstallationFixture` is a temporary forum installation with the
//! usual `applications/`, `plugins/`, `themes/` layout.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway installation root.
#[derive(Debug)]
pub struct InstallationFixture {
    // Held for cleanup on drop.
    _dir: TempDir,
    root: PathBuf,
}

impl InstallationFixture {
    /// Create an installation with empty category directories.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        // Canonical so paths compare equal to what the resolver normalizes.
        let root = dir.path().canonicalize().expect("canonicalize temp dir");
        for category in ["applications", "plugins", "themes"] {
            std::fs::create_dir_all(root.join(category)).expect("create category");
        }
        InstallationFixture { _dir: dir, root }
    }

    /// The installation root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add an addon directory with the given addon.json.
    pub fn add_addon(&self, category: &str, dir_name: &str, addon_json: &str) -> PathBuf {
        let dir = self.root.join(category).join(dir_name);
        std::fs::create_dir_all(&dir).expect("create addon dir");
        std::fs::write(dir.join("addon.json"), addon_json).expect("write addon.json");
        dir
    }

    /// Write a file relative to the installation root.
    pub fn write_file(&self, relative: impl AsRef<Path>, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, content).expect("write fixture file");
        path
    }
}

impl Default for InstallationFixture {
    fn default() -> Self {
        Self::new()
    }
}
