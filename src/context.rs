// src/context.rs

//! Run-wide execution context.
//!
//! A single [`RunContext`] is shared (behind an `Arc`) by every target and
//! work unit participating in one run. It carries:
//! - the current logging nesting depth
//! - the optional set of explicitly requested targets (allow-list)
//! - the dry-run flag

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;

use crate::types::TargetName;

/// Shared state for one run of the target tree.
///
/// Depth is an atomic because parallel task batches log through the same
/// context concurrently. The requested-target list and dry-run flag are
/// fixed for the lifetime of the run.
#[derive(Debug, Default)]
pub struct RunContext {
    depth: AtomicUsize,
    requested_targets: Vec<TargetName>,
    dry_run: bool,
}

impl RunContext {
    /// New unrestricted, non-dry-run context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the run to the given target names.
    ///
    /// A target executed while a non-empty list is set fails unless its
    /// name is on the list. Note that dependencies are gated too, so the
    /// list must cover the dependency closure of whatever is run.
    pub fn with_requested_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TargetName>,
    {
        self.requested_targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the run as a dry run: work units not flagged dry-run-safe are
    /// skipped by the execution wrapper.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Current logging nesting depth.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn increase_depth(&self) {
        self.depth.fetch_add(1, Ordering::SeqCst);
    }

    pub fn decrease_depth(&self) {
        // Saturating: a stray extra decrement must not wrap the counter.
        let _ = self
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| {
                Some(d.saturating_sub(1))
            });
    }

    /// The run's explicit target allow-list. Empty means "no restriction".
    pub fn requested_targets(&self) -> &[TargetName] {
        &self.requested_targets
    }

    /// Whether the given target name may execute under this context.
    pub fn allows(&self, name: &str) -> bool {
        self.requested_targets.is_empty() || self.requested_targets.iter().any(|t| t == name)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Log an info-level message indented by the current nesting depth.
    pub fn log_info(&self, message: &str) {
        let indent = " ".repeat(self.depth() * 2);
        info!("{indent}{message}");
    }
}
