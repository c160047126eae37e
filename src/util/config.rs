//! Configuration file support for addon-build.
//!
//! Two configuration file locations are read:
//! - Global: `~/.addon-build/config.toml` - User-wide defaults
//! - Project: `<installation>/.addon-build/config.toml` - Installation overrides
//!
//! Project config takes precedence over global config. CLI flags take
//! precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::resolver::manifests::ManifestMatch;

/// Addon keys whose source trees are always aliased, required or not.
pub const DEFAULT_ALWAYS_INCLUDE: [&str; 3] = ["core", "dashboard", "vanilla"];

/// Default port of the hot-reload dev server.
pub const DEFAULT_HOT_PORT: u16 = 3030;

/// addon-build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Bundler settings
    pub bundler: BundlerConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// How library manifests are matched to entry groups (substring, exact)
    pub manifest_match: Option<String>,

    /// Addon keys always present in the alias table
    pub always_include: Option<Vec<String>>,

    /// Addon keys enabled in the installation
    pub enabled_addons: Vec<String>,
}

/// Bundler-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    /// Path to the webpack executable
    pub command: Option<PathBuf>,

    /// Port of the hot-reload dev server
    pub hot_port: Option<u16>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.manifest_match.is_some() {
            self.build.manifest_match = other.build.manifest_match;
        }
        if other.build.always_include.is_some() {
            self.build.always_include = other.build.always_include;
        }
        if !other.build.enabled_addons.is_empty() {
            self.build.enabled_addons = other.build.enabled_addons;
        }

        if other.bundler.command.is_some() {
            self.bundler.command = other.bundler.command;
        }
        if other.bundler.hot_port.is_some() {
            self.bundler.hot_port = other.bundler.hot_port;
        }
    }

    /// Parse the manifest matching mode, defaulting to substring matching.
    pub fn manifest_match(&self) -> ManifestMatch {
        match self.build.manifest_match.as_deref() {
            None => ManifestMatch::default(),
            Some(s) => s.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; using substring matching", e);
                ManifestMatch::default()
            }),
        }
    }

    /// Addon keys always aliased.
    pub fn always_include(&self) -> Vec<String> {
        match &self.build.always_include {
            Some(keys) => keys.clone(),
            None => DEFAULT_ALWAYS_INCLUDE.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Hot-reload dev server port.
    pub fn hot_port(&self) -> u16 {
        self.bundler.hot_port.unwrap_or(DEFAULT_HOT_PORT)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (<installation>/.addon-build/config.toml)
/// 2. Global config (~/.addon-build/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the project config path for an installation.
pub fn project_config_path(vanilla_directory: &Path) -> PathBuf {
    vanilla_directory.join(".addon-build").join("config.toml")
}
