// src/work/stopwatch.rs

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Cumulative wall-clock timer for a work unit.
///
/// The elapsed time accumulates across repeated invocations of the same
/// unit. Interior mutability because units are invoked through `&self`;
/// the same unit instance must not be timed by two concurrent invocations
/// at once (one instance, one invocation at a time).
#[derive(Debug, Default)]
pub struct Stopwatch {
    inner: Mutex<StopwatchState>,
}

#[derive(Debug, Default)]
struct StopwatchState {
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing. No-op if already running.
    pub fn start(&self) {
        let mut state = self.inner.lock().unwrap();
        if state.started_at.is_none() {
            state.started_at = Some(Instant::now());
        }
    }

    /// Stop timing and fold the in-flight segment into the accumulated
    /// total. No-op if not running.
    pub fn stop(&self) {
        let mut state = self.inner.lock().unwrap();
        if let Some(started) = state.started_at.take() {
            state.accumulated += started.elapsed();
        }
    }

    /// Total elapsed time, including any in-flight segment.
    pub fn elapsed(&self) -> Duration {
        let state = self.inner.lock().unwrap();
        match state.started_at {
            Some(started) => state.accumulated + started.elapsed(),
            None => state.accumulated,
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().unwrap().started_at.is_some()
    }
}
