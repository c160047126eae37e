//! BuildRequest - the immutable input record of one build invocation.

use std::path::{Path, PathBuf};

/// Everything a build invocation was asked to do.
///
/// Constructed once from CLI flags and configuration, then passed by
/// reference through the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    /// Key of the addon being built
    pub addon_key: String,

    /// Installation root
    pub vanilla_directory: PathBuf,

    /// Primary addon directory first, then parent themes
    pub root_directories: Vec<PathBuf>,

    /// Directories of explicitly required addons
    pub required_directories: Vec<PathBuf>,

    /// Addon keys enabled in the installation
    pub enabled_addon_keys: Vec<String>,

    /// Re-register the entry pass with the bundler's watcher
    pub watch: bool,

    /// Show full bundler output
    pub verbose: bool,

    /// Serve entries through the hot-reload dev server
    pub hot: bool,
}

impl BuildRequest {
    /// Create a request for `addon_key` in the installation at `vanilla_directory`.
    pub fn new(addon_key: impl Into<String>, vanilla_directory: impl Into<PathBuf>) -> Self {
        BuildRequest {
            addon_key: addon_key.into(),
            vanilla_directory: vanilla_directory.into(),
            ..Default::default()
        }
    }

    /// Append a root directory (primary first, then parents).
    pub fn with_root_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_directories.push(dir.into());
        self
    }

    /// Append a required addon directory.
    pub fn with_required_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.required_directories.push(dir.into());
        self
    }

    /// Set the enabled addon keys.
    pub fn with_enabled_addons(mut self, keys: Vec<String>) -> Self {
        self.enabled_addon_keys = keys;
        self
    }

    /// Set watch mode.
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Set hot-reload mode.
    pub fn with_hot(mut self, hot: bool) -> Self {
        self.hot = hot;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Parent theme directories (every root directory after the primary).
    pub fn parent_directories(&self) -> &[PathBuf] {
        self.root_directories.get(1..).unwrap_or(&[])
    }

    /// The installation root.
    pub fn vanilla_directory(&self) -> &Path {
        &self.vanilla_directory
    }

    /// Whether an addon key is enabled.
    pub fn is_enabled(&self, key: &str) -> bool {
        self.enabled_addon_keys
            .iter()
            .any(|k| k.eq_ignore_ascii_case(key))
    }
}
