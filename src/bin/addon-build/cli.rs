//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use addon_build::core::BuildProcess;
use addon_build::resolver::ManifestMatch;

/// addon-build - builds the JavaScript bundles of forum addons
#[derive(Parser)]
#[command(name = "addon-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an addon's libraries and entries
    Build(BuildArgs),

    /// Show the order enabled addons must be built in
    Order(OrderArgs),

    /// Remove an addon's libraries and manifests
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InstallationArgs {
    /// Root of the forum installation
    #[arg(long, env = "VANILLA_DIRECTORY")]
    pub vanilla_directory: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub installation: InstallationArgs,

    /// Key of the addon to build (defaults to the key in addon.json)
    #[arg(long)]
    pub addon_key: Option<String>,

    /// Addon directory, then its parent themes (repeatable)
    #[arg(long = "root-directory")]
    pub root_directories: Vec<PathBuf>,

    /// Directory of a required addon to link against (repeatable)
    #[arg(long = "require")]
    pub required_directories: Vec<PathBuf>,

    /// Enabled addon keys, added to the configured ones
    #[arg(long = "enable", value_delimiter = ',')]
    pub enabled: Vec<String>,

    /// Override the build process declared in addon.json
    #[arg(long)]
    pub process: Option<BuildProcess>,

    /// How library manifests are matched (substring, exact)
    #[arg(long)]
    pub manifest_match: Option<ManifestMatch>,

    /// Keep rebuilding entries on change
    #[arg(short, long)]
    pub watch: bool,

    /// Serve entries from the hot-reload dev server
    #[arg(long)]
    pub hot: bool,

    /// Print the resolved configurations as JSON (no build)
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct OrderArgs {
    #[command(flatten)]
    pub installation: InstallationArgs,

    /// Enabled addon keys, added to the configured ones
    #[arg(long = "enable", value_delimiter = ',')]
    pub enabled: Vec<String>,
}

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub installation: InstallationArgs,

    /// Key of the addon to clean (defaults to the key in addon.json)
    #[arg(long)]
    pub addon_key: Option<String>,

    /// Addon directory
    #[arg(long = "root-directory")]
    pub root_directory: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
