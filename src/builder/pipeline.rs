//! The two-pass build.
//!
//! Both passes follow the same protocol:
//!
//! ```text
//! Idle --validate--> Skipped
//!      \-----------> Configuring --configs built--> Ready --bundler--> Done | Failed
//! ```
//!
//! The entry pass reads the library manifests the export pass writes, so
//! its configurations are only built after the export bundler run has
//! returned. A failed export pass aborts the build; a failed entry pass
//! leaves the export artifacts in place.

use std::fmt;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::bundler::Bundler;
use crate::builder::config::{BundleConfiguration, PassKind};
use crate::builder::context::BuildContext;
use crate::builder::entry_pass::build_entry_configurations;
use crate::builder::export_pass::build_export_configurations;
use crate::core::errors::BuildError;

/// Where a pass is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassState {
    Idle,
    /// Nothing declared; terminal
    Skipped,
    Configuring,
    Ready,
    Done,
    Failed,
}

impl fmt::Display for PassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PassState::Idle => "idle",
            PassState::Skipped => "skipped",
            PassState::Configuring => "configuring",
            PassState::Ready => "ready",
            PassState::Done => "done",
            PassState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub kind: PassKind,
    pub state: PassState,
    /// Names of the configurations handed to the bundler
    pub configurations: Vec<String>,
}

impl PassReport {
    fn new(kind: PassKind) -> Self {
        PassReport {
            kind,
            state: PassState::Idle,
            configurations: Vec::new(),
        }
    }

    fn transition(&mut self, state: PassState) {
        tracing::debug!("{} pass: {} -> {}", self.kind, self.state, state);
        self.state = state;
    }
}

/// Outcome of a whole build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub export: PassReport,
    pub entry: PassReport,
}

/// Every configuration a build would run, without running any.
///
/// Entry configurations only link manifests that already exist on disk.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub exports: Vec<BundleConfiguration>,
    pub entries: Vec<BundleConfiguration>,
}

impl BuildPlan {
    /// Resolve both passes.
    pub fn resolve(ctx: &BuildContext<'_>) -> Result<Self, BuildError> {
        Ok(BuildPlan {
            exports: build_export_configurations(ctx)?,
            entries: build_entry_configurations(ctx)?,
        })
    }

    /// Total number of configurations.
    pub fn len(&self) -> usize {
        self.exports.len() + self.entries.len()
    }

    /// Check if there is nothing to build.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type PassBuilder = fn(&BuildContext<'_>) -> Result<Vec<BundleConfiguration>, BuildError>;

/// Runs the export pass, then the entry pass, through a bundler.
pub struct Pipeline<'a, B: Bundler + ?Sized> {
    ctx: &'a BuildContext<'a>,
    bundler: &'a B,
}

impl<'a, B: Bundler + ?Sized> Pipeline<'a, B> {
    pub fn new(ctx: &'a BuildContext<'a>, bundler: &'a B) -> Self {
        Pipeline { ctx, bundler }
    }

    /// Run both passes in order.
    pub fn run(&self) -> Result<BuildReport> {
        let start = Instant::now();
        let key = self.ctx.addon_key();

        let export = self
            .run_pass(PassKind::Export, build_export_configurations)
            .with_context(|| format!("failed to build the libraries of `{}`", key))?;

        let entry = match self.run_pass(PassKind::Entry, build_entry_configurations) {
            Ok(report) => report,
            Err(e) => {
                if export.state == PassState::Done {
                    tracing::error!(
                        "entry pass of `{}` failed; library outputs were kept",
                        key
                    );
                }
                return Err(e.context(format!("failed to build the entries of `{}`", key)));
            }
        };

        tracing::info!(
            "built `{}` ({} librar{}, {} entr{}) in {:.2}s",
            key,
            export.configurations.len(),
            if export.configurations.len() == 1 { "y" } else { "ies" },
            entry.configurations.len(),
            if entry.configurations.len() == 1 { "y" } else { "ies" },
            start.elapsed().as_secs_f64()
        );

        Ok(BuildReport { export, entry })
    }

    fn run_pass(&self, kind: PassKind, build: PassBuilder) -> Result<PassReport> {
        let mut report = PassReport::new(kind);

        let declared = match kind {
            PassKind::Export => self.ctx.addon.export_groups().is_some(),
            PassKind::Entry => self.ctx.addon.entry_groups().is_some(),
        };
        if !declared {
            report.transition(PassState::Skipped);
            return Ok(report);
        }

        report.transition(PassState::Configuring);
        let configs = match build(self.ctx) {
            Ok(configs) => configs,
            Err(e) => {
                report.transition(PassState::Failed);
                return Err(e.into());
            }
        };
        report.configurations = configs.iter().map(|c| c.name.clone()).collect();
        report.transition(PassState::Ready);

        tracing::info!(
            "running {} {} configuration(s) with {}",
            configs.len(),
            kind,
            self.bundler.name()
        );
        match self.bundler.run(&configs) {
            Ok(()) => {
                report.transition(PassState::Done);
                Ok(report)
            }
            Err(e) => {
                report.transition(PassState::Failed);
                Err(e)
            }
        }
    }
}
