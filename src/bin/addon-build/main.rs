//! addon-build CLI - builds the JavaScript bundles of forum addons

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use addon_build::core::BuildError;
use addon_build::util::diagnostic::emit;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        // Domain errors get the full diagnostic with remediation steps.
        match e.chain().find_map(|cause| cause.downcast_ref::<BuildError>()) {
            Some(err) => {
                emit(&err.to_diagnostic(), color);
                let outer = e.to_string();
                if outer != err.to_string() {
                    eprintln!("  = while: {}", outer);
                }
            }
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("addon_build=debug")
    } else {
        EnvFilter::new("addon_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build(args) => commands::build::execute(args, cli.verbose),
        Commands::Order(args) => commands::order::execute(args),
        Commands::Clean(args) => commands::clean::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
