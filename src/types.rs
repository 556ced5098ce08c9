use std::str::FromStr;

use serde::Deserialize;

/// Canonical target name type used throughout the crate.
pub type TargetName = String;

/// Exit code carried by the error raised when a target is executed outside
/// a non-empty requested-target set.
pub const NOT_REQUESTED_EXIT_CODE: i32 = 3;

/// How a task attached to a target is executed relative to its neighbours.
///
/// - `Synchronous`: the task runs on its own, after all previously launched
///   work has completed.
/// - `Parallel`: the task joins the current batch of consecutive parallel
///   tasks; the whole batch is awaited before the next synchronous task
///   starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[serde(alias = "sync")]
    Synchronous,
    Parallel,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Synchronous
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "synchronous" | "sync" => Ok(ExecutionMode::Synchronous),
            "parallel" => Ok(ExecutionMode::Parallel),
            other => Err(format!(
                "invalid execution mode: {other} (expected \"synchronous\" or \"parallel\")"
            )),
        }
    }
}
