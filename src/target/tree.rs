// src/target/tree.rs

//! The target registry: ownership, default target and per-run state.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::model::BuildFile;
use crate::context::RunContext;
use crate::errors::{Result, RundagError};
use crate::target::target::Target;
use crate::types::{ExecutionMode, TargetName};
use crate::work::shell::ShellTask;

/// Per-run execution state of a target.
///
/// `Running` doubles as the cycle sentinel: target-level execution is
/// sequential, so a dependency found in the `Running` state is an ancestor
/// of the current recursion, which means the dependency chain loops back
/// on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Done,
}

/// Outcome of the atomic check-and-mark performed before a target's body
/// runs.
enum BeginExecution {
    Started,
    AlreadyDone,
    InProgress,
}

/// Owns the full set of targets by name, the default-target slot, and the
/// set of targets already executed in the current run.
///
/// The tree is mutated while the build is being described
/// ([`create_target`](TargetTree::create_target) and the target builder
/// methods) and then drives execution: [`run`](TargetTree::run) executes a
/// target's full dependency closure exactly once each, in declared order,
/// before the target's own body.
#[derive(Debug, Default)]
pub struct TargetTree {
    targets: HashMap<TargetName, Target>,
    default_target: Option<TargetName>,
    run_state: Mutex<HashMap<TargetName, RunState>>,
}

impl TargetTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a validated [`BuildFile`].
    pub fn from_config(cfg: &BuildFile) -> Result<Self> {
        let mut tree = Self::new();

        for (name, tc) in cfg.targets() {
            let target = tree.create_target(name.clone())?;
            if let Some(description) = &tc.description {
                target.set_description(description);
            }
            if tc.hidden {
                target.hide();
            }
            target.depends_on_all(tc.deps.iter().cloned());

            for task in &tc.task {
                let mut unit = ShellTask::new(&task.cmd);
                if let Some(task_name) = &task.name {
                    unit = unit.named(task_name);
                }
                if task.dry_run_safe {
                    unit = unit.dry_run_safe();
                }
                if task.log_duration {
                    unit = unit.log_duration();
                }
                match task.mode {
                    ExecutionMode::Synchronous => target.add_task(unit),
                    ExecutionMode::Parallel => target.add_parallel_task(unit),
                };
            }
        }

        if let Some(default) = cfg.default_target() {
            tree.set_default(default)?;
        }

        Ok(tree)
    }

    /// Create a new target and return it for builder-style configuration.
    pub fn create_target(&mut self, name: impl Into<TargetName>) -> Result<&mut Target> {
        let name = name.into();
        if self.targets.contains_key(&name) {
            return Err(RundagError::ConfigError(format!(
                "target '{name}' already exists"
            )));
        }
        Ok(self
            .targets
            .entry(name.clone())
            .or_insert_with(|| Target::new(name)))
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    pub fn target_mut(&mut self, name: &str) -> Option<&mut Target> {
        self.targets.get_mut(name)
    }

    /// Names of all registered targets.
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(|s| s.as_str())
    }

    /// Targets not marked hidden, for help-style listings.
    pub fn visible_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values().filter(|t| !t.is_hidden())
    }

    /// Mark the named target as the default for
    /// [`run_default`](TargetTree::run_default).
    pub fn set_default(&mut self, name: impl Into<TargetName>) -> Result<()> {
        let name = name.into();
        if !self.targets.contains_key(&name) {
            return Err(RundagError::TargetNotFound(name));
        }
        self.default_target = Some(name);
        Ok(())
    }

    pub fn default_target(&self) -> Option<&str> {
        self.default_target.as_deref()
    }

    /// Read-only view of a target's per-run state, if it participated in
    /// the current run.
    pub fn run_state_of(&self, name: &str) -> Option<RunState> {
        self.run_state.lock().unwrap().get(name).copied()
    }

    /// Forget all per-run state so the next `run` starts a fresh run.
    pub fn reset_run_state(&self) {
        self.run_state.lock().unwrap().clear();
        debug!("target tree: run state reset");
    }

    /// Execute the named target: its full dependency closure first,
    /// exactly once each in dependency order, then the target's own action
    /// and task list. Returns 0 on success; failures are typed errors.
    ///
    /// A target already executed in this run (including via another
    /// dependent) is skipped.
    pub async fn run(&self, ctx: &Arc<RunContext>, name: &str) -> Result<i32> {
        self.execute_target(ctx, name).await
    }

    /// Execute the default target.
    pub async fn run_default(&self, ctx: &Arc<RunContext>) -> Result<i32> {
        let name = self.default_target.clone().ok_or_else(|| {
            RundagError::ConfigError("no default target has been set".to_string())
        })?;
        self.execute_target(ctx, &name).await
    }

    /// Execute every not-yet-executed dependency, in declared order.
    ///
    /// Duplicate entries are skipped naturally on the second visit via the
    /// `Done` state.
    pub(crate) async fn ensure_dependencies_executed(
        &self,
        ctx: &Arc<RunContext>,
        dependencies: &[TargetName],
    ) -> Result<()> {
        for dependency in dependencies {
            self.execute_target(ctx, dependency).await?;
        }
        Ok(())
    }

    /// Recursive execution entry point. Boxed because the future recurses
    /// through `Target::execute` → `ensure_dependencies_executed`.
    pub(crate) fn execute_target<'a>(
        &'a self,
        ctx: &'a Arc<RunContext>,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        Box::pin(async move {
            let target = self
                .targets
                .get(name)
                .ok_or_else(|| RundagError::TargetNotFound(name.to_string()))?;

            match self.begin_execution(name) {
                BeginExecution::AlreadyDone => {
                    debug!("target '{name}' already executed in this run; skipping");
                    return Ok(0);
                }
                BeginExecution::InProgress => {
                    return Err(RundagError::DependencyCycle(name.to_string()));
                }
                BeginExecution::Started => {}
            }

            let status = target.execute(self, ctx).await?;
            self.mark_done(name);
            Ok(status)
        })
    }

    /// Atomic check-and-mark: a single lock covers the state lookup and
    /// the transition to `Running`, keeping the at-most-once invariant
    /// even if two dependents race to trigger the same dependency.
    fn begin_execution(&self, name: &str) -> BeginExecution {
        let mut state = self.run_state.lock().unwrap();
        match state.get(name) {
            Some(RunState::Done) => BeginExecution::AlreadyDone,
            Some(RunState::Running) => BeginExecution::InProgress,
            None => {
                state.insert(name.to_string(), RunState::Running);
                BeginExecution::Started
            }
        }
    }

    fn mark_done(&self, name: &str) {
        self.run_state
            .lock()
            .unwrap()
            .insert(name.to_string(), RunState::Done);
    }
}
