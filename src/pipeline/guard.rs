//! Scoped guard that owns the final log line of a run

use std::time::Instant;
use tracing::{error, info};

use super::StageTracker;
use crate::error::FatalError;

/// Logs exactly one closing line for the run. A guard dropped without
/// [`RunGuard::succeeded`] or [`RunGuard::failed`] (a panic) logs the stage that
/// was active.
pub struct RunGuard {
    tracker: StageTracker,
    organization: String,
    started: Instant,
    finished: bool,
}

impl RunGuard {
    pub fn new(tracker: StageTracker, organization: impl Into<String>) -> Self {
        Self {
            tracker,
            organization: organization.into(),
            started: Instant::now(),
            finished: false,
        }
    }

    pub fn succeeded(&mut self) {
        self.finished = true;
        info!(
            "Run for {} finished: {} in {:.2?}",
            self.organization,
            self.tracker.current(),
            self.started.elapsed()
        );
    }

    pub fn failed(&mut self, err: &FatalError) {
        self.finished = true;
        error!(
            "Run for {} failed during {}: {}",
            self.organization, self.tracker, err
        );
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.finished {
            error!(
                "Run for {} ended unexpectedly during {}",
                self.organization, self.tracker
            );
        }
    }
}

/// Final log line for a run cut short by a signal
pub fn log_interrupted(tracker: &StageTracker, signal: &str) {
    error!("Received {}; aborting during {}", signal, tracker);
}
