//! Webpack backend.
//!
//! Each configuration is rendered to a `webpack.config.js` under
//! `<installation>/cache/addon-build/<addon>/` and run with the webpack
//! CLI. Export passes use `DllPlugin`, every linked library manifest
//! becomes a `DllReferencePlugin`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Map, Value};

use crate::builder::bundler::Bundler;
use crate::builder::config::{BundleConfiguration, BundleMode};
use crate::core::errors::BuildError;
use crate::resolver::alias::LIBRARY_ALIAS;
use crate::util::config::Config;
use crate::util::fs::write_string;
use crate::util::process::{find_webpack, ProcessBuilder};

/// Where rendered configurations are written, below the installation root.
pub const CACHE_DIR: &str = "cache/addon-build";

const EXTENSIONS: [&str; 6] = [".js", ".jsx", ".ts", ".tsx", ".json", ".mjs"];

/// Runs configurations through the webpack CLI.
#[derive(Debug, Clone)]
pub struct WebpackBundler {
    program: PathBuf,
    vanilla_directory: PathBuf,
    verbose: bool,
}

impl WebpackBundler {
    pub fn new(program: impl Into<PathBuf>, vanilla_directory: impl Into<PathBuf>) -> Self {
        WebpackBundler {
            program: program.into(),
            vanilla_directory: vanilla_directory.into(),
            verbose: false,
        }
    }

    /// Find webpack for an installation: configured command, the
    /// installation's `node_modules/.bin`, then PATH.
    pub fn locate(vanilla_directory: &Path, config: &Config) -> Result<Self, BuildError> {
        let path = std::env::var_os("PATH");
        Self::locate_in(vanilla_directory, config, path.as_deref())
    }

    fn locate_in(
        vanilla_directory: &Path,
        config: &Config,
        search_path: Option<&OsStr>,
    ) -> Result<Self, BuildError> {
        let mut searched = Vec::new();
        if let Some(command) = &config.bundler.command {
            searched.push(command.clone());
            if command.is_file() {
                return Ok(WebpackBundler::new(command, vanilla_directory));
            }
            tracing::warn!("configured bundler {} does not exist", command.display());
        }

        match find_webpack(vanilla_directory, search_path, &mut searched) {
            Some(program) => {
                tracing::debug!("using webpack at {}", program.display());
                Ok(WebpackBundler::new(program, vanilla_directory))
            }
            None => Err(BuildError::BundlerNotFound { searched }),
        }
    }

    /// Pass the bundler's own output through instead of a spinner.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Path of the rendered file for a configuration.
    pub fn config_path(&self, config: &BundleConfiguration) -> PathBuf {
        self.vanilla_directory
            .join(CACHE_DIR)
            .join(&config.addon_key)
            .join(format!("{}.config.js", config.name))
    }

    fn write_config(&self, config: &BundleConfiguration) -> Result<PathBuf> {
        let path = self.config_path(config);
        write_string(&path, &render(config))?;
        tracing::debug!("wrote {}", path.display());
        Ok(path)
    }

    fn command(&self, config_file: &Path, mode: BundleMode) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .arg("--config")
            .arg(config_file)
            .env("NODE_ENV", mode.as_str())
            .cwd(&self.vanilla_directory)
    }

    fn run_one(&self, config: &BundleConfiguration) -> Result<()> {
        let file = self.write_config(config)?;
        let cmd = self.command(&file, config.mode);
        tracing::debug!("running {}", cmd.display_command());

        if self.verbose {
            let status = cmd.status()?;
            if !status.success() {
                return Err(BuildError::BundlerFailed {
                    config: config.name.clone(),
                    command: cmd.display_command(),
                    status: status.code(),
                }
                .into());
            }
            return Ok(());
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Bundling {}", config.name));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let output = cmd.exec();
        spinner.finish_and_clear();
        let output = output?;

        if !output.status.success() {
            // The bundler's diagnostics are shown as it printed them.
            eprint!("{}", String::from_utf8_lossy(&output.stdout));
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
            return Err(BuildError::BundlerFailed {
                config: config.name.clone(),
                command: cmd.display_command(),
                status: output.status.code(),
            }
            .into());
        }
        Ok(())
    }

    /// Write every configuration plus one multi-config file requiring them.
    fn write_multi_config(&self, configs: &[BundleConfiguration], name: &str) -> Result<PathBuf> {
        let mut files = Vec::new();
        for config in configs {
            files.push(self.write_config(config)?);
        }

        let addon_key = configs.first().map(|c| c.addon_key.as_str()).unwrap_or_default();
        let combined = self
            .vanilla_directory
            .join(CACHE_DIR)
            .join(addon_key)
            .join(format!("{}.config.js", name));
        let requires: Vec<String> = files
            .iter()
            .map(|f| format!("    require({}),", json!(f.display().to_string())))
            .collect();
        write_string(
            &combined,
            &format!("module.exports = [\n{}\n];\n", requires.join("\n")),
        )?;
        Ok(combined)
    }

    /// Run a long-lived webpack process until it exits.
    fn run_blocking(&self, cmd: ProcessBuilder, label: &str) -> Result<()> {
        let status = cmd.status()?;
        if !status.success() {
            return Err(BuildError::BundlerFailed {
                config: label.to_string(),
                command: cmd.display_command(),
                status: status.code(),
            }
            .into());
        }
        Ok(())
    }

    /// Hand every configuration to one watching webpack process.
    fn run_watch(&self, configs: &[BundleConfiguration]) -> Result<()> {
        let Some(first) = configs.first() else {
            return Ok(());
        };
        let combined = self.write_multi_config(configs, "watch")?;
        let cmd = self.command(&combined, first.mode).arg("--watch");
        tracing::info!("watching {} configuration(s)", configs.len());
        self.run_blocking(cmd, "watch")
    }

    /// Serve every configuration from the webpack dev server with hot
    /// module replacement, on the port their public paths point at.
    fn run_serve(&self, configs: &[BundleConfiguration], port: u16) -> Result<()> {
        let Some(first) = configs.first() else {
            return Ok(());
        };
        let combined = self.write_multi_config(configs, "serve")?;
        let cmd = ProcessBuilder::new(&self.program)
            .arg("serve")
            .arg("--config")
            .arg(&combined)
            .arg("--hot")
            .arg("--port")
            .arg(port.to_string())
            .env("NODE_ENV", first.mode.as_str())
            .cwd(&self.vanilla_directory);
        tracing::info!(
            "serving {} configuration(s) on http://localhost:{}",
            configs.len(),
            port
        );
        self.run_blocking(cmd, "serve")
    }
}

impl Bundler for WebpackBundler {
    fn name(&self) -> &str {
        "webpack"
    }

    fn run(&self, configs: &[BundleConfiguration]) -> Result<()> {
        if let Some(port) = configs.iter().find_map(|c| c.hot) {
            return self.run_serve(configs, port);
        }
        if configs.iter().any(|c| c.watch) {
            return self.run_watch(configs);
        }

        // One at a time keeps the bundler's output readable.
        for config in configs {
            let start = Instant::now();
            self.run_one(config)?;
            tracing::info!(
                "bundled {} in {:.2}s",
                config.name,
                start.elapsed().as_secs_f64()
            );
        }
        Ok(())
    }
}

/// Render a configuration as a webpack config module.
pub fn render(config: &BundleConfiguration) -> String {
    let mut plugins = Vec::new();

    if let Some(library) = &config.library {
        plugins.push(format!(
            "new webpack.DllPlugin({})",
            json!({
                "context": config.context,
                "name": library.name,
                "path": library.manifest_path,
            })
        ));
    }
    for reference in &config.references {
        plugins.push(format!(
            "new webpack.DllReferencePlugin({{ context: {}, manifest: require({}) }})",
            json!(config.context),
            json!(reference.path),
        ));
    }
    if config.hot.is_some() {
        plugins.push("new webpack.HotModuleReplacementPlugin()".to_string());
    }

    let body = serde_json::to_string_pretty(&webpack_options(config)).unwrap_or_default();
    let plugins = plugins
        .iter()
        .map(|p| format!("        {},", p))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "// Generated by addon-build for `{}`.\nconst webpack = require(\"webpack\");\n\nmodule.exports = Object.assign({}, {{\n    plugins: [\n{}\n    ],\n}});\n",
        config.name, body, plugins
    )
}

fn webpack_options(config: &BundleConfiguration) -> Value {
    let mut output = Map::new();
    output.insert("path".into(), json!(config.output.path));
    output.insert("filename".into(), json!(config.output.filename));
    if let Some(chunk) = &config.output.chunk_filename {
        output.insert("chunkFilename".into(), json!(chunk));
    }
    if let Some(public_path) = &config.output.public_path {
        output.insert("publicPath".into(), json!(public_path));
    }
    if let Some(library) = &config.library {
        output.insert("library".into(), json!(library.name));
    }

    let mut alias = Map::new();
    for (name, path) in config.aliases.iter() {
        alias.insert(name.to_string(), json!(path));
    }
    if let Some(library) = config.aliases.get(LIBRARY_ALIAS) {
        // Legacy imports of the shared library use the bare name.
        alias.entry("library").or_insert_with(|| json!(library));
    }

    let devtool = match config.mode {
        BundleMode::Production => json!(false),
        BundleMode::Development => json!("eval-source-map"),
    };

    let mut options = json!({
        "name": config.name,
        "mode": config.mode.as_str(),
        "context": config.context,
        "entry": config.entry,
        "output": output,
        "resolve": {
            "alias": alias,
            "modules": config.module_directories,
            "extensions": EXTENSIONS,
        },
        "optimization": { "minimize": config.minify },
        "devtool": devtool,
    });

    if let Some(port) = config.hot {
        // Pages are served by the forum, chunks by the dev server.
        options["devServer"] = json!({
            "port": port,
            "hot": true,
            "headers": { "Access-Control-Allow-Origin": "*" },
        });
    }
    options
}
