// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{BuildFile, RawBuildFile};
use crate::errors::Result;

/// Load a build file from a given path and return the raw `RawBuildFile`.
///
/// This only performs TOML deserialization; it does **not** perform
/// semantic validation (reference and cycle checks). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawBuildFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawBuildFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a build file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - unknown `deps` references and self-dependencies,
///   - a default target that does not exist,
///   - dependency cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BuildFile> {
    let raw_config = load_from_path(&path)?;
    let config = BuildFile::try_from(raw_config)?;
    Ok(config)
}

/// Helper to resolve a default build-file path.
///
/// Currently this just returns `Rundag.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `RUNDAG_CONFIG`).
/// - Support project-local config discovery.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Rundag.toml")
}
