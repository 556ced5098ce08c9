// src/target/mod.rs

//! Targets and the dependency-ordered execution core.
//!
//! - [`target`] holds the [`Target`] type: builder surface, action and the
//!   per-target execution body.
//! - [`batch`] partitions a target's ordered step list into sequential
//!   steps and maximal parallel batches.
//! - [`tree`] owns all targets by name and drives dependency-ordered,
//!   at-most-once execution.

pub mod batch;
pub mod target;
pub mod tree;

pub use batch::{StepGroup, TargetStep};
pub use target::Target;
pub use tree::{RunState, TargetTree};
