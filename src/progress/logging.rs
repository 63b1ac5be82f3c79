//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, error, info};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted {
                organization,
                version,
            } => {
                info!(organization = %organization, version = %version, "Starting framework run");
            }
            ProgressEvent::StateChanged { from, to } => {
                info!(from = %from, to = %to, "Pipeline state changed");
            }
            ProgressEvent::StageStarted { stage } => {
                info!(stage = %stage, "Starting stage");
            }
            ProgressEvent::StageComplete {
                stage,
                attempts,
                duration,
            } => {
                info!(
                    stage = %stage,
                    attempts,
                    duration_ms = duration.as_millis(),
                    "Stage complete"
                );
            }
            ProgressEvent::RetryScheduled {
                command,
                attempt,
                max_attempts,
                delay,
            } => {
                debug!(
                    command = %command,
                    progress = format!("{}/{}", attempt, max_attempts),
                    delay_ms = delay.as_millis(),
                    "Retry scheduled"
                );
            }
            ProgressEvent::RepairReported {
                fixer,
                outcome,
                success,
            } => {
                debug!(fixer = %fixer, outcome = %outcome, success, "Repair reported");
            }
            ProgressEvent::RunCompleted { total_time } => {
                info!(total_time_ms = total_time.as_millis(), "Run complete");
            }
            ProgressEvent::RunFailed { error } => {
                error!(error = %error, "Run aborted");
            }
        }
    }
}
