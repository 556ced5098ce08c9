// src/config/mod.rs

//! Declarative TOML build-file support.
//!
//! - [`model`] maps the TOML document onto serde types.
//! - [`validate`] turns a [`model::RawBuildFile`] into a validated
//!   [`model::BuildFile`] (reference and cycle checks).
//! - [`loader`] reads and validates a file from disk.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{BuildFile, ConfigSection, RawBuildFile, TargetConfig, TaskConfig};
