// src/lib.rs

//! `rundag`: dependency-ordered build/target execution core.
//!
//! A build is a set of named targets, each with an ordered dependency list
//! and an ordered task list. Running a target executes its full dependency
//! closure exactly once each, in dependency order, then the target's own
//! action and tasks; consecutive parallel-tagged tasks run concurrently as
//! one jointly-awaited batch.

pub mod config;
pub mod context;
pub mod errors;
pub mod logging;
pub mod target;
pub mod types;
pub mod work;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::loader::load_and_validate;
use crate::context::RunContext;
use crate::errors::Result;
use crate::target::TargetTree;

/// Options for a [`run_build_file`] invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Targets to run, in order. Empty means "run the default target".
    pub targets: Vec<String>,
    /// Restrict the run to the listed targets (and anything else they pull
    /// in must also be listed); a target outside the list fails with exit
    /// code 3.
    pub restrict_to_requested: bool,
    /// Skip every task not flagged dry-run-safe.
    pub dry_run: bool,
}

/// High-level entry point: load a build file, construct the target tree
/// and run the requested (or default) targets in one session.
///
/// This wires together:
/// - config loading and validation
/// - target tree construction
/// - the shared run context
pub async fn run_build_file(path: impl AsRef<Path>, options: RunOptions) -> Result<i32> {
    let cfg = load_and_validate(path)?;
    let tree = TargetTree::from_config(&cfg)?;

    let mut ctx = RunContext::new().with_dry_run(options.dry_run);
    if options.restrict_to_requested {
        ctx = ctx.with_requested_targets(options.targets.iter().cloned());
    }
    let ctx = Arc::new(ctx);

    if options.targets.is_empty() {
        info!("no targets requested; running default target");
        return tree.run_default(&ctx).await;
    }

    for name in &options.targets {
        tree.run(&ctx, name).await?;
    }
    Ok(0)
}
