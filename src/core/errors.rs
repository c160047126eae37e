//! Build error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::context::VANILLA_DIRECTORY_ENV;

/// Error raised while resolving or building an addon.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    #[error("addon `{addon_key}` is not inside the installation at {}", vanilla_directory.display())]
    #[diagnostic(
        code(addon_build::topology::addon_not_found),
        help("symlink the addon into the installation or set VANILLA_DIRECTORY")
    )]
    AddonNotFound {
        addon_key: String,
        vanilla_directory: PathBuf,
        searched: Vec<PathBuf>,
    },

    #[error("failed to read addon manifest {}", path.display())]
    #[diagnostic(code(addon_build::config::read))]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid addon manifest {}: {source}", path.display())]
    #[diagnostic(code(addon_build::config::parse))]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("library manifest {} could not be read", path.display())]
    #[diagnostic(code(addon_build::topology::library_manifest_read))]
    LibraryManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("library manifest {} is corrupt: {source}", path.display())]
    #[diagnostic(code(addon_build::topology::library_manifest_corrupt))]
    LibraryManifestCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no webpack executable found")]
    #[diagnostic(code(addon_build::bundler::not_found))]
    BundlerNotFound { searched: Vec<PathBuf> },

    #[error("bundler failed while building `{config}`")]
    #[diagnostic(code(addon_build::bundler::failed))]
    BundlerFailed {
        config: String,
        command: String,
        status: Option<i32>,
    },

    #[error("dependency cycle between addons: {}", addons.join(" -> "))]
    #[diagnostic(code(addon_build::order::cycle))]
    DependencyCycle { addons: Vec<String> },
}

impl BuildError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::AddonNotFound {
                addon_key,
                vanilla_directory,
                searched,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "addon `{}` could not be found inside the installation",
                    addon_key
                ))
                .with_location(vanilla_directory.clone());

                for path in searched {
                    diag = diag.with_context(format!("looked in {}", path.display()));
                }

                diag.with_suggestion(suggestions::SYMLINK_ADDON)
                    .with_suggestion(suggestions::SET_VANILLA_DIRECTORY)
                    .with_context(format!(
                        "the installation root is taken from --vanilla-directory or {}",
                        VANILLA_DIRECTORY_ENV
                    ))
            }

            BuildError::ManifestRead { path, source } => {
                Diagnostic::error(format!("failed to read addon manifest: {}", source))
                    .with_location(path.clone())
            }

            BuildError::ManifestParse { path, source } => {
                Diagnostic::error("addon manifest is not valid JSON")
                    .with_location(path.clone())
                    .with_context(source.to_string())
            }

            BuildError::LibraryManifestRead { path, source } => {
                Diagnostic::error(format!("failed to read library manifest: {}", source))
                    .with_location(path.clone())
                    .with_suggestion(suggestions::REBUILD_LIBRARY)
            }

            BuildError::LibraryManifestCorrupt { path, source } => {
                Diagnostic::error("library manifest is corrupt")
                    .with_location(path.clone())
                    .with_context(source.to_string())
                    .with_context("bundling without it would inline code the library already provides")
                    .with_suggestion(suggestions::REBUILD_LIBRARY)
            }

            BuildError::BundlerNotFound { searched } => {
                let mut diag = Diagnostic::error("no webpack executable found");
                for path in searched {
                    diag = diag.with_context(format!("looked for {}", path.display()));
                }
                diag.with_suggestion(suggestions::INSTALL_WEBPACK)
            }

            BuildError::BundlerFailed {
                config,
                command,
                status,
            } => {
                let status = match status {
                    Some(code) => format!("exit code {}", code),
                    None => "terminated by signal".to_string(),
                };
                Diagnostic::error(format!("bundler failed while building `{}`", config))
                    .with_context(format!("`{}` ({})", command, status))
                    .with_suggestion(suggestions::BUILD_FAILED)
            }

            BuildError::DependencyCycle { addons } => {
                Diagnostic::error("addons require each other")
                    .with_context(addons.join(" -> "))
                    .with_suggestion(suggestions::BREAK_CYCLE)
            }
        }
    }
}
