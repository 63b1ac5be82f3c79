//! Progress handler trait and events

use std::sync::Mutex;
use std::time::Duration;

use crate::pipeline::{PipelineState, Stage};

/// Events emitted while a run moves through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Run started for an organization
    RunStarted {
        organization: String,
        version: String,
    },

    /// The state machine moved
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },

    /// A stage began
    StageStarted { stage: Stage },

    /// A stage finished successfully
    StageComplete {
        stage: Stage,
        attempts: u32,
        duration: Duration,
    },

    /// A retried command failed and will sleep before the next attempt
    RetryScheduled {
        command: String,
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
    },

    /// A repair fixer reported its outcome
    RepairReported {
        fixer: String,
        outcome: String,
        success: bool,
    },

    /// Run reached `Done`
    RunCompleted { total_time: Duration },

    /// Run reached `Aborted`
    RunFailed { error: String },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Handler that keeps every event, for callers that inspect a run afterwards
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Delays of every `RetryScheduled` event, in order
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::RetryScheduled { delay, .. } => Some(delay),
                _ => None,
            })
            .collect()
    }
}

impl ProgressHandler for RecordingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
