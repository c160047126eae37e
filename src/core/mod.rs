//! Core data structures for addon-build.
//!
//! This module contains the foundational types used throughout the build:
//! - Addon descriptors read from addon.json
//! - Entry/export declarations
//! - The build request and library manifests
//! - Build errors

pub mod addon;
pub mod entry;
pub mod errors;
pub mod library_manifest;
pub mod request;

pub use addon::{AddonDescriptor, BuildProcess, CssTool, ADDON_MANIFEST};
pub use entry::{is_valid_entry_point, EntryGroups};
pub use errors::BuildError;
pub use library_manifest::LibraryManifest;
pub use request::BuildRequest;
