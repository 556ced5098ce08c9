use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rundag::context::RunContext;
use rundag::errors::{Result, RundagError};
use rundag::work::unit::{UnitMeta, WorkUnit};

/// Shared, ordered record of probe events for a test.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Snapshot of the event log.
pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Index of the first occurrence of `event`, panicking with a readable
/// message if it never happened.
pub fn index_of(log: &EventLog, event: &str) -> usize {
    let snapshot = events(log);
    snapshot
        .iter()
        .position(|e| e == event)
        .unwrap_or_else(|| panic!("event '{event}' not found in {snapshot:?}"))
}

/// Number of occurrences of `event`.
pub fn count_of(log: &EventLog, event: &str) -> usize {
    events(log).iter().filter(|e| *e == event).count()
}

/// A work unit that records `<name>:start` / `<name>:end` (or
/// `<name>:fail`) events into a shared log, so tests can assert execution
/// ordering without running real processes.
///
/// The async path uses a tokio sleep, so probes in a parallel batch
/// genuinely overlap.
pub struct ProbeUnit {
    name: String,
    events: EventLog,
    delay: Duration,
    fail_with: Option<i32>,
    meta: UnitMeta,
}

impl ProbeUnit {
    pub fn new(name: impl Into<String>, events: EventLog) -> Self {
        let name = name.into();
        Self {
            meta: UnitMeta::described(name.clone()),
            name,
            events,
            delay: Duration::ZERO,
            fail_with: None,
        }
    }

    /// Sleep for the given number of milliseconds inside the unit's logic.
    pub fn with_delay_ms(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    /// Fail after the delay with a `TaskExecution` error carrying `code`.
    pub fn failing(mut self, code: i32) -> Self {
        self.fail_with = Some(code);
        self
    }

    pub fn dry_run_safe(mut self) -> Self {
        self.meta.set_dry_run_safe(true);
        self
    }

    pub fn log_duration(mut self) -> Self {
        self.meta.set_log_duration(true);
        self
    }

    fn record(&self, suffix: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, suffix));
    }

    fn finish(&self) -> Result<()> {
        match self.fail_with {
            Some(code) => {
                self.record("fail");
                Err(RundagError::task_failure(
                    code,
                    format!("probe '{}' failed as instructed", self.name),
                ))
            }
            None => {
                self.record("end");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl WorkUnit for ProbeUnit {
    type Output = ();

    fn meta(&self) -> &UnitMeta {
        &self.meta
    }

    fn perform(&self, _ctx: &RunContext) -> Result<()> {
        self.record("start");
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.finish()
    }

    async fn perform_async(&self, _ctx: &RunContext) -> Result<()> {
        self.record("start");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.finish()
    }
}
