//! Firing observers.
//!
//! [`Simulation::run`] forwards every committed firing to the
//! registered observers. Observers are read-only consumers: they see
//! the firing record, never the engine, so they cannot perturb the
//! markings mid-run.
//!
//! [`Simulation::run`]: crate::sim::Simulation::run

use std::sync::{Arc, Mutex};

use tracing::info;

use crate::firing::Firing;

/// Callback invoked after each committed firing.
pub trait Observer: Send {
    /// Called with every firing committed during a run.
    fn on_firing(&mut self, firing: &Firing);
}

/// Logs each firing through `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceObserver;

impl Observer for TraceObserver {
    fn on_firing(&mut self, firing: &Firing) {
        info!(
            event = %firing.event_name,
            clock = firing.time,
            consumed = firing.consumed.len(),
            produced = firing.produced.len(),
            "firing"
        );
    }
}

/// Collects firing records in memory for tests and post-run analysis.
///
/// Cloning the log yields a handle onto the same underlying record
/// list, so a clone can be registered with the engine while the
/// original stays readable after the run.
#[derive(Debug, Clone, Default)]
pub struct FiringLog {
    records: Arc<Mutex<Vec<Firing>>>,
}

impl FiringLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records collected so far.
    pub fn records(&self) -> Vec<Firing> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Number of recorded firings.
    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    /// `true` when nothing has fired yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Observer for FiringLog {
    fn on_firing(&mut self, firing: &Firing) {
        if let Ok(mut records) = self.records.lock() {
            records.push(firing.clone());
        }
    }
}
