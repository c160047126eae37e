//! Implementation of `addon-build build`.

use anyhow::Result;

use crate::builder::bundler::Bundler;
use crate::builder::context::{BuildContext, BuildSettings};
use crate::builder::pipeline::{BuildPlan, BuildReport, Pipeline};
use crate::core::request::BuildRequest;

/// Warn about required directories that cannot contribute anything.
fn check_required_directories(request: &BuildRequest) {
    for dir in &request.required_directories {
        if !dir.is_dir() {
            tracing::warn!(
                "required addon directory {} does not exist; nothing will be linked from it",
                dir.display()
            );
        }
    }
}

/// Build one addon: export pass, then entry pass.
pub fn build(
    request: &BuildRequest,
    settings: BuildSettings,
    bundler: &dyn Bundler,
) -> Result<BuildReport> {
    check_required_directories(request);
    let ctx = BuildContext::new(request, settings)?;
    Pipeline::new(&ctx, bundler).run()
}

/// Resolve every configuration a build would run, without bundling.
pub fn plan(request: &BuildRequest, settings: BuildSettings) -> Result<BuildPlan> {
    let ctx = BuildContext::new(request, settings)?;
    Ok(BuildPlan::resolve(&ctx)?)
}
