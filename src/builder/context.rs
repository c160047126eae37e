//! Build context - the resolved addon, its topology and pass settings.

use std::path::{Path, PathBuf};

use crate::builder::config::ManifestReference;
use crate::core::addon::{AddonDescriptor, BuildProcess};
use crate::core::errors::BuildError;
use crate::core::library_manifest::LibraryManifest;
use crate::core::request::BuildRequest;
use crate::resolver::alias::AliasTable;
use crate::resolver::manifests::{manifest_paths_for_directory, ManifestMatch};
use crate::resolver::topology::{resolve_primary_directory, TopologyCache};
use crate::util::config::{Config, DEFAULT_ALWAYS_INCLUDE, DEFAULT_HOT_PORT};
use crate::util::fs::{dedup_dirs, normalize_path, relative_path, to_url_path};

/// Settings that shape configurations but are not part of the request.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// How library manifests are matched to groups
    pub manifest_match: ManifestMatch,

    /// Addon keys always present in alias tables
    pub always_include: Vec<String>,

    /// Hot-reload dev server port
    pub hot_port: u16,

    /// Build process to use instead of the one addon.json declares
    pub process_override: Option<BuildProcess>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            manifest_match: ManifestMatch::default(),
            always_include: DEFAULT_ALWAYS_INCLUDE.iter().map(|k| k.to_string()).collect(),
            hot_port: DEFAULT_HOT_PORT,
            process_override: None,
        }
    }
}

impl BuildSettings {
    /// Settings from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        BuildSettings {
            manifest_match: config.manifest_match(),
            always_include: config.always_include(),
            hot_port: config.hot_port(),
            process_override: None,
        }
    }

    /// Force a build process.
    pub fn with_process(mut self, process: Option<BuildProcess>) -> Self {
        self.process_override = process;
        self
    }

    /// Set the manifest matching mode.
    pub fn with_manifest_match(mut self, manifest_match: ManifestMatch) -> Self {
        self.manifest_match = manifest_match;
        self
    }
}

/// Everything the pass builders need, resolved once per invocation.
#[derive(Debug)]
pub struct BuildContext<'a> {
    /// The request being served
    pub request: &'a BuildRequest,

    /// Descriptor of the addon being built
    pub addon: AddonDescriptor,

    /// Directory of the addon being built
    pub primary_directory: PathBuf,

    /// Normalized installation root
    pub vanilla_directory: PathBuf,

    /// Pass settings
    pub settings: BuildSettings,

    topology: TopologyCache,
}

impl<'a> BuildContext<'a> {
    /// Resolve the primary addon and read its descriptor.
    pub fn new(request: &'a BuildRequest, settings: BuildSettings) -> Result<Self, BuildError> {
        let primary_directory = resolve_primary_directory(request)?;
        let mut addon = AddonDescriptor::load_or_bare(&primary_directory)?;
        if addon.key.is_empty() {
            addon.key = request.addon_key.clone();
        }

        tracing::debug!(
            "building `{}` ({} process) from {}",
            addon.key,
            settings.process_override.unwrap_or(addon.build.process),
            primary_directory.display()
        );

        Ok(BuildContext {
            request,
            addon,
            primary_directory,
            vanilla_directory: normalize_path(&request.vanilla_directory),
            settings,
            topology: TopologyCache::new(),
        })
    }

    /// Effective build process.
    pub fn process(&self) -> BuildProcess {
        self.settings
            .process_override
            .unwrap_or(self.addon.build.process)
    }

    /// Addon key used in artifact names.
    pub fn addon_key(&self) -> &str {
        &self.addon.key
    }

    /// The primary addon, then its parent themes.
    pub fn root_directories(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.primary_directory.clone()];
        dirs.extend(self.request.parent_directories().iter().cloned());
        dedup_dirs(dirs)
    }

    /// Addons whose libraries this build may link against.
    ///
    /// For the core process this starts with every enabled core-build
    /// addon (installation root first), followed by the required
    /// directories of the request.
    pub fn dependency_directories(&self) -> Result<Vec<PathBuf>, BuildError> {
        let mut dirs = Vec::new();
        if self.process() == BuildProcess::Core {
            dirs.extend(self.topology.core_build_addons(self.request)?.iter().cloned());
        }
        dirs.extend(self.request.required_directories.iter().cloned());
        Ok(dedup_dirs(dirs))
    }

    /// Library directories for the export pass, without the addon itself.
    pub fn export_library_directories(&self) -> Result<Vec<PathBuf>, BuildError> {
        let own = normalize_path(&self.primary_directory);
        Ok(self
            .dependency_directories()?
            .into_iter()
            .filter(|dir| normalize_path(dir) != own)
            .collect())
    }

    /// Library directories for the entry pass: dependencies, then roots.
    pub fn entry_link_directories(&self) -> Result<Vec<PathBuf>, BuildError> {
        let mut dirs = self.dependency_directories()?;
        dirs.extend(self.root_directories());
        Ok(dedup_dirs(dirs))
    }

    /// Alias table over `directories` plus the always-included addons.
    pub fn alias_table(&self, directories: &[PathBuf]) -> Result<AliasTable, BuildError> {
        AliasTable::build(
            &self.vanilla_directory,
            directories,
            &self.settings.always_include,
        )
    }

    /// Every library manifest under `directories` eligible for group `key`.
    ///
    /// Unreadable or corrupt manifests fail the pass.
    pub fn linked_manifests(
        &self,
        directories: &[PathBuf],
        key: &str,
    ) -> Result<Vec<ManifestReference>, BuildError> {
        let mut references = Vec::new();
        for dir in directories {
            for path in manifest_paths_for_directory(dir) {
                if !self.settings.manifest_match.matches(key, &path) {
                    continue;
                }
                let manifest = LibraryManifest::load(&path)?;
                tracing::debug!("`{}` links {} ({})", key, manifest.name, path.display());
                references.push(ManifestReference { path, manifest });
            }
        }
        Ok(references)
    }

    /// Installation-relative URL path of the addon, with a leading slash.
    ///
    /// Taken from where the addon sits in the installation tree; for a
    /// symlinked addon that is the link, not its target.
    pub fn public_base(&self) -> String {
        let relative = [self.vanilla_directory.as_path(), self.request.vanilla_directory.as_path()]
            .into_iter()
            .find_map(|root| self.primary_directory.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| {
                relative_path(&self.vanilla_directory, &normalize_path(&self.primary_directory))
            });
        let path = to_url_path(&relative);
        if path.is_empty() {
            String::new()
        } else {
            format!("/{}", path)
        }
    }

    /// Installation root.
    pub fn vanilla_directory(&self) -> &Path {
        &self.vanilla_directory
    }
}
