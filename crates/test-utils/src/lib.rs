//! Shared test utilities for the S-100 portal workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Dataset, catalog and service-config fixtures
//! - Catalog doubles that fail or count lookups
//! - XML inspection helpers
//! - Temporary configuration directories
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod config_dir;
pub mod fixtures;
pub mod lookups;
pub mod xml;

pub use config_dir::*;
pub use fixtures::*;
pub use lookups::*;
pub use xml::*;
