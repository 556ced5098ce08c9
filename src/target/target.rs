// src/target/target.rs

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::debug;

use crate::context::RunContext;
use crate::errors::{Result, RundagError};
use crate::target::batch::{group_steps, StepGroup, TargetStep};
use crate::target::tree::TargetTree;
use crate::types::{ExecutionMode, TargetName, NOT_REQUESTED_EXIT_CODE};
use crate::work::unit::{ExecScope, SharedUnit, UnitMeta, WorkUnit};

/// Direct action callback invoked with the run context before the target's
/// task list.
pub type TargetAction = Box<dyn Fn(&RunContext) -> Result<()> + Send + Sync>;

/// A named, at-most-once-per-run unit of dependency-ordered work.
///
/// A target combines an optional direct action with an ordered list of
/// (work unit, execution mode) steps, plus dependency links to other
/// targets by name. Dependencies are resolved lazily against the owning
/// [`TargetTree`] at execution time, so forward references are fine.
///
/// Targets are mutated through the builder-style methods below until the
/// run begins; execution goes through [`TargetTree::run`].
pub struct Target {
    name: TargetName,
    description: Option<String>,
    hidden: bool,
    dependencies: Vec<TargetName>,
    steps: Vec<TargetStep>,
    action: Option<TargetAction>,
    meta: UnitMeta,
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("hidden", &self.hidden)
            .field("dependencies", &self.dependencies)
            .field("steps", &self.steps)
            .field("has_action", &self.action.is_some())
            .finish_non_exhaustive()
    }
}

impl Target {
    pub(crate) fn new(name: impl Into<TargetName>) -> Self {
        let name = name.into();
        let meta = UnitMeta::described(format!("Executing target {name}")).with_log_duration(true);
        Self {
            name,
            description: None,
            hidden: false,
            dependencies: Vec::new(),
            steps: Vec::new(),
            action: None,
            meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Declared dependencies, in order. Duplicates are kept as declared;
    /// execution deduplicates through the tree's run state.
    pub fn dependencies(&self) -> &[TargetName] {
        &self.dependencies
    }

    pub fn steps(&self) -> &[TargetStep] {
        &self.steps
    }

    /// Cumulative wall-clock time spent executing this target.
    pub fn elapsed(&self) -> std::time::Duration {
        self.meta.stopwatch().elapsed()
    }

    // ---- builder surface (pre-run only) ----

    /// Add a dependency by target name.
    pub fn depends_on(&mut self, name: impl Into<TargetName>) -> &mut Self {
        self.dependencies.push(name.into());
        self
    }

    /// Add several dependencies by name, in order.
    pub fn depends_on_all<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TargetName>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a dependency on another target, recorded by name.
    pub fn depends_on_target(&mut self, target: &Target) -> &mut Self {
        self.dependencies.push(target.name.clone());
        self
    }

    /// Add dependencies on several targets, recorded by name, in order.
    pub fn depends_on_targets<'a, I>(&mut self, targets: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a Target>,
    {
        for target in targets {
            self.dependencies.push(target.name.clone());
        }
        self
    }

    pub fn set_description(&mut self, text: impl Into<String>) -> &mut Self {
        self.description = Some(text.into());
        self
    }

    /// Hide the target from listings; execution is unaffected.
    pub fn hide(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    /// Set the direct action callback. Fails if an action is already set;
    /// use [`force_action`](Target::force_action) to overwrite.
    pub fn set_action<F>(&mut self, action: F) -> Result<&mut Self>
    where
        F: Fn(&RunContext) -> Result<()> + Send + Sync + 'static,
    {
        if self.action.is_some() {
            return Err(RundagError::ActionAlreadySet(self.name.clone()));
        }
        self.action = Some(Box::new(action));
        Ok(self)
    }

    /// Set the direct action callback, overwriting any existing one.
    pub fn force_action<F>(&mut self, action: F) -> &mut Self
    where
        F: Fn(&RunContext) -> Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Append a task in synchronous mode.
    pub fn add_task<U>(&mut self, unit: U) -> &mut Self
    where
        U: WorkUnit<Output = ()> + 'static,
    {
        self.push_step(Arc::new(unit), ExecutionMode::Synchronous)
    }

    /// Append a task in parallel mode.
    pub fn add_parallel_task<U>(&mut self, unit: U) -> &mut Self
    where
        U: WorkUnit<Output = ()> + 'static,
    {
        self.push_step(Arc::new(unit), ExecutionMode::Parallel)
    }

    /// Append several tasks in synchronous mode, in order.
    pub fn add_tasks<I>(&mut self, units: I) -> &mut Self
    where
        I: IntoIterator<Item = SharedUnit>,
    {
        for unit in units {
            self.push_step(unit, ExecutionMode::Synchronous);
        }
        self
    }

    /// Append several tasks in parallel mode, in order.
    pub fn add_parallel_tasks<I>(&mut self, units: I) -> &mut Self
    where
        I: IntoIterator<Item = SharedUnit>,
    {
        for unit in units {
            self.push_step(unit, ExecutionMode::Parallel);
        }
        self
    }

    fn push_step(&mut self, unit: SharedUnit, mode: ExecutionMode) -> &mut Self {
        self.steps.push(TargetStep { unit, mode });
        self
    }

    // ---- execution ----

    /// Execute this target's body: dependencies first, then the
    /// allow-list gate, the action, and the grouped task list.
    ///
    /// The caller ([`TargetTree::execute_target`]) has already marked the
    /// target as running; marking happens before dependency recursion so
    /// that shared dependencies are skipped and cycles are detected.
    pub(crate) async fn execute(&self, tree: &TargetTree, ctx: &Arc<RunContext>) -> Result<i32> {
        let _scope = ExecScope::enter(ctx, &self.meta);

        tree.ensure_dependencies_executed(ctx, &self.dependencies)
            .await?;

        if !ctx.allows(&self.name) {
            return Err(RundagError::task_failure(
                NOT_REQUESTED_EXIT_CODE,
                format!(
                    "target '{}' is not among the requested targets for this run",
                    self.name
                ),
            ));
        }

        if let Some(action) = &self.action {
            action(ctx.as_ref())?;
        }

        self.run_steps(ctx).await?;

        Ok(0)
    }

    async fn run_steps(&self, ctx: &Arc<RunContext>) -> Result<()> {
        for group in group_steps(&self.steps) {
            match group {
                StepGroup::Sequential(step) => {
                    // Blocks until the unit completes; every previously
                    // launched batch has already been joined.
                    step.unit.run_sync(ctx)?;
                }
                StepGroup::Parallel(batch) => {
                    join_parallel_batch(ctx, batch).await?;
                }
            }
        }
        Ok(())
    }
}

/// Launch every unit of a batch on the worker pool and await them all.
///
/// All members are awaited even when one fails; siblings are never
/// cancelled early. The first error (in completion order) propagates after
/// the whole batch has settled.
async fn join_parallel_batch(ctx: &Arc<RunContext>, batch: &[TargetStep]) -> Result<()> {
    let mut join_set = JoinSet::new();
    for step in batch {
        let unit = Arc::clone(&step.unit);
        let ctx = Arc::clone(ctx);
        join_set.spawn(async move { unit.run_async(&ctx).await });
    }

    let mut first_err: Option<RundagError> = None;
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if first_err.is_none() {
                    first_err = Some(err);
                } else {
                    debug!(error = %err, "additional failure in parallel batch");
                }
            }
            Err(join_err) => {
                if first_err.is_none() {
                    first_err = Some(
                        anyhow::anyhow!("parallel task panicked: {join_err}").into(),
                    );
                }
            }
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
