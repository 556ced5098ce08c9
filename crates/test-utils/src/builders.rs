#![allow(dead_code)]

use std::collections::BTreeMap;
use rundag::config::{BuildFile, ConfigSection, RawBuildFile, TargetConfig, TaskConfig};
use rundag::types::ExecutionMode;

/// Builder for `BuildFile` to simplify test setup.
pub struct BuildFileBuilder {
    config: RawBuildFile,
}

impl BuildFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawBuildFile {
                config: ConfigSection::default(),
                target: BTreeMap::new(),
            },
        }
    }

    pub fn with_target(mut self, name: &str, target: TargetConfig) -> Self {
        self.config.target.insert(name.to_string(), target);
        self
    }

    pub fn with_default_target(mut self, name: &str) -> Self {
        self.config.config.default_target = Some(name.to_string());
        self
    }

    pub fn build(self) -> BuildFile {
        BuildFile::try_from(self.config).expect("Failed to build valid config from builder")
    }

    /// Raw, unvalidated form for tests exercising validation failures.
    pub fn build_raw(self) -> RawBuildFile {
        self.config
    }
}

impl Default for BuildFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TargetConfig`.
pub struct TargetConfigBuilder {
    target: TargetConfig,
}

impl TargetConfigBuilder {
    pub fn new() -> Self {
        Self {
            target: TargetConfig {
                description: None,
                hidden: false,
                deps: vec![],
                task: vec![],
            },
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.target.description = Some(text.to_string());
        self
    }

    pub fn hidden(mut self, val: bool) -> Self {
        self.target.hidden = val;
        self
    }

    pub fn dep(mut self, name: &str) -> Self {
        self.target.deps.push(name.to_string());
        self
    }

    pub fn task(mut self, task: TaskConfig) -> Self {
        self.target.task.push(task);
        self
    }

    pub fn build(self) -> TargetConfig {
        self.target
    }
}

impl Default for TargetConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.to_string(),
                name: None,
                mode: ExecutionMode::Synchronous,
                dry_run_safe: false,
                log_duration: false,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.task.name = Some(name.to_string());
        self
    }

    pub fn parallel(mut self) -> Self {
        self.task.mode = ExecutionMode::Parallel;
        self
    }

    pub fn dry_run_safe(mut self, val: bool) -> Self {
        self.task.dry_run_safe = val;
        self
    }

    pub fn log_duration(mut self, val: bool) -> Self {
        self.task.log_duration = val;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
