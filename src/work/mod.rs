// src/work/mod.rs

//! Work units and the execution wrapper.
//!
//! - [`unit`] defines the [`WorkUnit`] trait and the wrapper behaviour
//!   (timing, depth-scoped logging, dry-run gating) shared by every unit.
//! - [`stopwatch`] provides the cumulative wall-clock timer.
//! - [`shell`] is the concrete shell-command unit produced by the config
//!   layer.

pub mod shell;
pub mod stopwatch;
pub mod unit;

pub use shell::ShellTask;
pub use stopwatch::Stopwatch;
pub use unit::{SharedUnit, UnitMeta, WorkUnit};
