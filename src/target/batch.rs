// src/target/batch.rs

//! Step grouping for the batching algorithm.
//!
//! A target's ordered task list is partitioned into groups before
//! execution: every synchronous step is its own group, and each maximal
//! run of consecutive parallel steps forms a single batch that is launched
//! together and jointly awaited. The partition is computed up front so the
//! execution loop needs no lookahead bookkeeping.

use std::fmt;

use crate::types::ExecutionMode;
use crate::work::unit::{SharedUnit, WorkUnit};

/// One entry in a target's task list: a work unit plus the mode it was
/// attached with.
#[derive(Clone)]
pub struct TargetStep {
    pub unit: SharedUnit,
    pub mode: ExecutionMode,
}

impl fmt::Debug for TargetStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetStep")
            .field("description", &self.unit.meta().description())
            .field("mode", &self.mode)
            .finish()
    }
}

/// A unit of scheduling produced by [`group_steps`].
#[derive(Debug)]
pub enum StepGroup<'a> {
    /// A single synchronous step; runs to completion before the next group.
    Sequential(&'a TargetStep),
    /// A maximal run of consecutive parallel steps; launched together and
    /// fully joined before the next group starts.
    Parallel(&'a [TargetStep]),
}

/// Partition an ordered step list into execution groups.
pub fn group_steps(steps: &[TargetStep]) -> Vec<StepGroup<'_>> {
    let mut groups = Vec::new();
    let mut i = 0;

    while i < steps.len() {
        match steps[i].mode {
            ExecutionMode::Synchronous => {
                groups.push(StepGroup::Sequential(&steps[i]));
                i += 1;
            }
            ExecutionMode::Parallel => {
                let start = i;
                while i < steps.len() && steps[i].mode == ExecutionMode::Parallel {
                    i += 1;
                }
                groups.push(StepGroup::Parallel(&steps[start..i]));
            }
        }
    }

    groups
}
