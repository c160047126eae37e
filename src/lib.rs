//! addon-build - builds the JavaScript bundles of forum addons
//!
//! Resolves which addons a build links against, turns each addon's
//! declared exports into shared libraries and its entries into bundles
//! that reuse those libraries instead of inlining their code.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// Only compiled for tests. Provides a temporary installation fixture
/// and a recording bundler.
#[cfg(test)]
pub mod test_support;

pub use crate::builder::{BuildContext, BuildSettings, BundleConfiguration, Bundler, Pipeline};
pub use crate::core::{AddonDescriptor, BuildError, BuildRequest};
pub use crate::resolver::AliasTable;
pub use crate::util::context::GlobalContext;
