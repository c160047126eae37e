//! The seam between configuration resolution and the external bundler.

use anyhow::Result;

use crate::builder::config::BundleConfiguration;

/// Something that can run resolved bundle configurations.
///
/// `run` must not return before every output of every configuration,
/// library manifests included, is on disk: the entry pass reads them
/// right after.
pub trait Bundler {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Run the configurations of one pass, to completion.
    fn run(&self, configs: &[BundleConfiguration]) -> Result<()>;
}
