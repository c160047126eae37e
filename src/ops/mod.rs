//! High-level operations.
//!
//! This module contains the implementation of addon-build commands.

pub mod addon_build;
pub mod addon_clean;
pub mod addon_order;

pub use addon_build::{build, plan};
pub use addon_clean::{clean, CleanResult};
pub use addon_order::{addon_order, OrderResult, OrderedAddon};
