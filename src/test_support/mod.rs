//! Test utilities and mocks for unit tests.
//!
//! `RecordingBundler` stands in for webpack: it records every run and can
//! write the library manifests an export pass would produce.

pub mod fixtures;

use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::builder::bundler::Bundler;
use crate::builder::config::BundleConfiguration;

pub use fixtures::*;

/// Mock bundler that records what it was asked to run.
#[derive(Debug, Default)]
pub struct RecordingBundler {
    runs: Mutex<Vec<Vec<String>>>,
    configurations: Mutex<Vec<BundleConfiguration>>,
    write_manifests: bool,
    fail_on: Option<String>,
}

impl RecordingBundler {
    /// Record only.
    pub fn new() -> Self {
        RecordingBundler::default()
    }

    /// Also write a manifest for every export configuration.
    pub fn writing_manifests() -> Self {
        RecordingBundler {
            write_manifests: true,
            ..RecordingBundler::default()
        }
    }

    /// Fail the run containing the named configuration.
    pub fn failing_on(name: &str) -> Self {
        RecordingBundler::new().fail_on(name)
    }

    /// Fail the run containing the named configuration.
    pub fn fail_on(mut self, name: &str) -> Self {
        self.fail_on = Some(name.to_string());
        self
    }

    /// Configuration names of each run, in call order.
    pub fn runs(&self) -> Vec<Vec<String>> {
        self.runs.lock().unwrap().clone()
    }

    /// Every configuration handed over, in call order.
    pub fn configurations(&self) -> Vec<BundleConfiguration> {
        self.configurations.lock().unwrap().clone()
    }
}

impl Bundler for RecordingBundler {
    fn name(&self) -> &str {
        "recording"
    }

    fn run(&self, configs: &[BundleConfiguration]) -> Result<()> {
        self.runs
            .lock()
            .unwrap()
            .push(configs.iter().map(|c| c.name.clone()).collect());
        self.configurations
            .lock()
            .unwrap()
            .extend(configs.iter().cloned());

        if let Some(name) = &self.fail_on {
            if configs.iter().any(|c| &c.name == name) {
                bail!("bundling `{}` failed", name);
            }
        }

        if self.write_manifests {
            for config in configs {
                if let Some(library) = &config.library {
                    let manifest = serde_json::json!({ "name": library.name, "content": {} });
                    crate::util::fs::write_string(&library.manifest_path, &manifest.to_string())?;
                }
            }
        }
        Ok(())
    }
}
