// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::ExecutionMode;

/// Top-level build file as read from TOML, before validation.
///
/// ```toml
/// [config]
/// default_target = "build"
///
/// [target.clean]
/// description = "Remove build artifacts"
///
/// [[target.clean.task]]
/// cmd = "rm -rf out"
/// name = "delete files"
///
/// [target.build]
/// deps = ["clean"]
///
/// [[target.build.task]]
/// cmd = "cc -o out/app main.c"
///
/// [[target.build.task]]
/// cmd = "tar -czf out/docs.tar.gz docs"
/// mode = "parallel"
/// ```
///
/// All sections are optional and have reasonable defaults; validation
/// requires at least one target.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBuildFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All targets from `[target.<name>]`.
    ///
    /// Keys are the *target names* (e.g. `"clean"`, `"build"`).
    #[serde(default)]
    pub target: BTreeMap<String, TargetConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Name of the target run when none is requested explicitly.
    #[serde(default)]
    pub default_target: Option<String>,
}

/// `[target.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TargetConfig {
    /// Help text shown in target listings.
    #[serde(default)]
    pub description: Option<String>,

    /// Hidden targets are excluded from listings but execute normally.
    #[serde(default)]
    pub hidden: bool,

    /// Dependency list: targets executed before this one, in order.
    ///
    /// Duplicates are allowed; execution deduplicates per run.
    #[serde(default)]
    pub deps: Vec<String>,

    /// Ordered task list from `[[target.<name>.task]]`.
    #[serde(default)]
    pub task: Vec<TaskConfig>,
}

/// One `[[target.<name>.task]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// The shell command to execute.
    pub cmd: String,

    /// Optional display name for log lines; defaults to the command.
    #[serde(default)]
    pub name: Option<String>,

    /// `"synchronous"` (default) or `"parallel"`.
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Whether the command may run during a dry run.
    #[serde(default)]
    pub dry_run_safe: bool,

    /// Whether to log the elapsed duration after the command finishes.
    #[serde(default)]
    pub log_duration: bool,
}

/// A validated build file.
///
/// Constructed through `TryFrom<RawBuildFile>` (see `config::validate`),
/// which guarantees that dependency references resolve, the default target
/// exists and the dependency graph is acyclic.
#[derive(Debug, Clone)]
pub struct BuildFile {
    config: ConfigSection,
    target: BTreeMap<String, TargetConfig>,
}

impl BuildFile {
    /// Construct without validation. Only `config::validate` should call
    /// this.
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        target: BTreeMap<String, TargetConfig>,
    ) -> Self {
        Self { config, target }
    }

    pub fn targets(&self) -> &BTreeMap<String, TargetConfig> {
        &self.target
    }

    pub fn get(&self, name: &str) -> Option<&TargetConfig> {
        self.target.get(name)
    }

    pub fn default_target(&self) -> Option<&str> {
        self.config.default_target.as_deref()
    }
}
