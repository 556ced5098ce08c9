// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RundagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Action already set on target '{0}'")]
    ActionAlreadySet(String),

    #[error("Dependency cycle involving target '{0}'")]
    DependencyCycle(String),

    #[error("Task execution failed with exit code {exit_code}: {message}")]
    TaskExecution { exit_code: i32, message: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RundagError {
    /// Build a [`RundagError::TaskExecution`] from an exit code and message.
    pub fn task_failure(exit_code: i32, message: impl Into<String>) -> Self {
        RundagError::TaskExecution {
            exit_code,
            message: message.into(),
        }
    }

    /// Process exit code hint for the caller that turns this error into an
    /// exit status. `TaskExecution` carries its own code; everything else
    /// maps to a generic failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RundagError::TaskExecution { exit_code, .. } => *exit_code,
            _ => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RundagError>;
