//! Global context for addon-build operations.
//!
//! Provides centralized access to configuration paths and the
//! installation directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::BaseDirs;

use crate::util::config::{load_config, project_config_path, Config};

/// Environment variable naming the installation root.
pub const VANILLA_DIRECTORY_ENV: &str = "VANILLA_DIRECTORY";

/// Directory a valid installation root must contain.
const INSTALLATION_MARKER: &str = "applications";

static BASE_DIRS: LazyLock<Option<BaseDirs>> = LazyLock::new(BaseDirs::new);

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global data (~/.addon-build/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = match BASE_DIRS.as_ref() {
            Some(dirs) => dirs.home_dir().join(".addon-build"),
            None => PathBuf::from(".addon-build"),
        };

        Ok(GlobalContext {
            cwd,
            home,
            verbose: false,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Load the merged configuration for an installation.
    pub fn load_config(&self, vanilla_directory: &Path) -> Config {
        load_config(&self.config_path(), &project_config_path(vanilla_directory))
    }

    /// Resolve the installation root.
    ///
    /// An explicit directory wins. Otherwise the working directory and its
    /// ancestors are searched for one containing `applications/`.
    pub fn installation_root(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            let dir = if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                self.cwd.join(dir)
            };
            return Ok(crate::util::fs::normalize_path(&dir));
        }

        let mut current = self.cwd.clone();
        loop {
            if current.join(INSTALLATION_MARKER).is_dir() {
                return Ok(current);
            }
            if !current.pop() {
                anyhow::bail!(
                    "could not find an installation root above {}\n\
                     help: pass --vanilla-directory or set {}",
                    self.cwd.display(),
                    VANILLA_DIRECTORY_ENV
                );
            }
        }
    }
}
