// src/work/unit.rs

//! The [`WorkUnit`] trait and the execution wrapper.
//!
//! Every task, regardless of what it does, runs through the wrapper entry
//! points [`WorkUnit::run_sync`] / [`WorkUnit::run_async`]. The wrapper
//! adds, around the unit's own logic:
//! - the cumulative stopwatch
//! - a depth-indented log line for the unit's description
//! - a scoped depth increment
//! - dry-run gating
//!
//! Cleanup (stop the stopwatch, restore the depth, optionally log the
//! duration) is performed by a drop guard, so it runs on every exit path,
//! including errors and panics, and the original error propagates
//! untouched.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;

use crate::context::RunContext;
use crate::errors::Result;
use crate::work::stopwatch::Stopwatch;

/// Shared handle to a work unit as held in a target's task list.
pub type SharedUnit = Arc<dyn WorkUnit<Output = ()>>;

/// Wrapper-facing attributes of a work unit.
///
/// Concrete units embed one of these and hand it out via
/// [`WorkUnit::meta`]; the wrapper never needs to know anything else about
/// the unit.
#[derive(Debug, Default)]
pub struct UnitMeta {
    description: Option<String>,
    dry_run_safe: bool,
    log_duration: bool,
    stopwatch: Stopwatch,
}

impl UnitMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a meta with only a description set.
    pub fn described(text: impl Into<String>) -> Self {
        Self::new().with_description(text)
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn with_dry_run_safe(mut self, safe: bool) -> Self {
        self.dry_run_safe = safe;
        self
    }

    pub fn with_log_duration(mut self, log: bool) -> Self {
        self.log_duration = log;
        self
    }

    pub fn set_description(&mut self, text: impl Into<String>) {
        self.description = Some(text.into());
    }

    pub fn set_dry_run_safe(&mut self, safe: bool) {
        self.dry_run_safe = safe;
    }

    pub fn set_log_duration(&mut self, log: bool) {
        self.log_duration = log;
    }

    /// Display name used for the "executing" log line. `None` logs nothing.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the unit may run during a dry run.
    pub fn dry_run_safe(&self) -> bool {
        self.dry_run_safe
    }

    /// Whether to log the elapsed duration after each invocation.
    pub fn log_duration(&self) -> bool {
        self.log_duration
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }
}

/// The smallest unit of executable logic.
///
/// Implementors provide [`perform`](WorkUnit::perform) (and optionally a
/// native async [`perform_async`](WorkUnit::perform_async)); callers go
/// through [`run_sync`](WorkUnit::run_sync) /
/// [`run_async`](WorkUnit::run_async), which add the wrapper behaviour.
///
/// The stopwatch and depth bookkeeping are per-invocation state on the
/// unit/context pair: one unit instance must not be invoked concurrently
/// with itself.
#[async_trait]
pub trait WorkUnit: Send + Sync {
    /// Result type produced by the unit's logic. `Default` supplies the
    /// value returned when a dry run skips the unit.
    type Output: Default + Send + 'static;

    fn meta(&self) -> &UnitMeta;

    /// The unit's actual logic, synchronous form.
    fn perform(&self, ctx: &RunContext) -> Result<Self::Output>;

    /// Asynchronous form of the unit's logic.
    ///
    /// Defaults to running [`perform`](WorkUnit::perform) off the async
    /// scheduler via `block_in_place`; override for units with a native
    /// async implementation.
    async fn perform_async(&self, ctx: &RunContext) -> Result<Self::Output> {
        task::block_in_place(|| self.perform(ctx))
    }

    /// Synchronous wrapper entry point: blocks until the unit completes.
    fn run_sync(&self, ctx: &RunContext) -> Result<Self::Output> {
        let _scope = ExecScope::enter(ctx, self.meta());
        if skip_for_dry_run(ctx, self.meta()) {
            return Ok(Self::Output::default());
        }
        self.perform(ctx)
    }

    /// Asynchronous wrapper entry point.
    async fn run_async(&self, ctx: &RunContext) -> Result<Self::Output> {
        let _scope = ExecScope::enter(ctx, self.meta());
        if skip_for_dry_run(ctx, self.meta()) {
            return Ok(Self::Output::default());
        }
        self.perform_async(ctx).await
    }
}

fn skip_for_dry_run(ctx: &RunContext, meta: &UnitMeta) -> bool {
    if ctx.is_dry_run() && !meta.dry_run_safe() {
        ctx.log_info("skipped (dry run)");
        return true;
    }
    false
}

/// Drop guard implementing the wrapper's enter/exit behaviour.
///
/// `enter` starts the stopwatch, logs the description at the current depth
/// and increments the depth; dropping stops the stopwatch, restores the
/// depth and optionally logs the elapsed duration. Dropping happens on
/// every exit path, so depth and timer stay symmetric even when the unit's
/// logic fails.
pub(crate) struct ExecScope<'a> {
    ctx: &'a RunContext,
    meta: &'a UnitMeta,
}

impl<'a> ExecScope<'a> {
    pub(crate) fn enter(ctx: &'a RunContext, meta: &'a UnitMeta) -> Self {
        meta.stopwatch().start();
        if let Some(description) = meta.description() {
            ctx.log_info(description);
        }
        ctx.increase_depth();
        Self { ctx, meta }
    }
}

impl Drop for ExecScope<'_> {
    fn drop(&mut self) {
        self.meta.stopwatch().stop();
        self.ctx.decrease_depth();
        if self.meta.log_duration() {
            let secs = self.meta.stopwatch().elapsed().as_secs();
            let name = self.meta.description().unwrap_or("work unit");
            self.ctx.log_info(&format!("{name} finished (took {secs}s)"));
        }
    }
}
