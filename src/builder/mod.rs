//! Bundle configuration and the two-pass build.
//!
//! The export pass turns each export group into a shared library; the
//! entry pass builds the shippable bundles against those libraries.

pub mod bundler;
pub mod config;
pub mod context;
pub mod entry_pass;
pub mod export_pass;
pub mod pipeline;
pub mod webpack;

pub use bundler::Bundler;
pub use config::{BundleConfiguration, BundleMode, ManifestReference, PassKind};
pub use context::{BuildContext, BuildSettings};
pub use entry_pass::build_entry_configurations;
pub use export_pass::build_export_configurations;
pub use pipeline::{BuildPlan, BuildReport, PassState, Pipeline};
pub use webpack::WebpackBundler;
