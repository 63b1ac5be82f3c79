use std::time::Instant;
use tracing::info;

use super::{BuildPipeline, BuildResult, RunContext, RunGuard, RunReport, Stage, StageTracker, StateMachine};
use crate::error::FatalError;
use crate::preflight::{Preflight, Ready};
use crate::progress::ProgressEvent;

/// Top-level controller for one run
///
/// The organization is resolved before preflight, so an unsupported
/// organization fails without installing anything or touching the root.
pub struct Orchestrator {
    ctx: RunContext,
    tracker: StageTracker,
}

impl Orchestrator {
    pub fn new(ctx: RunContext) -> Self {
        Self {
            ctx,
            tracker: StageTracker::new(),
        }
    }

    /// Shares `tracker` with an observer such as the signal handler
    pub fn with_tracker(mut self, tracker: StageTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn run(&self) -> Result<RunReport, FatalError> {
        let config = &self.ctx.config;
        let started = Instant::now();
        let mut guard = RunGuard::new(self.tracker.clone(), config.organization());

        info!(
            "Starting {} run for {} ({})",
            crate::NAME,
            config.organization(),
            config.version()
        );
        self.ctx.progress.on_progress(&ProgressEvent::RunStarted {
            organization: config.organization().to_string(),
            version: config.version().to_string(),
        });

        match self.execute() {
            Ok(report) => {
                self.ctx.progress.on_progress(&ProgressEvent::RunCompleted {
                    total_time: started.elapsed(),
                });
                guard.succeeded();
                Ok(report)
            }
            Err(err) => {
                self.ctx.progress.on_progress(&ProgressEvent::RunFailed {
                    error: err.to_string(),
                });
                guard.failed(&err);
                Err(err)
            }
        }
    }

    fn execute(&self) -> Result<RunReport, FatalError> {
        let machine = StateMachine::with_tracker(self.tracker.clone());
        let mut pipeline = BuildPipeline::new(&self.ctx, machine);

        let task = self
            .ctx
            .registry
            .resolve(self.ctx.config.organization())
            .map_err(|err| pipeline.abort(err))?;
        info!(
            "Resolved {} to stacks: {}",
            task.org_key,
            task.stacks()
                .iter()
                .map(|s| s.slug())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let ready = self.preflight(&mut pipeline).map_err(|err| pipeline.abort(err))?;
        pipeline.with_preflight(ready).execute(&task)
    }

    fn preflight(&self, pipeline: &mut BuildPipeline<'_>) -> Result<Ready, FatalError> {
        self.tracker.enter(Stage::Preflight);
        self.ctx
            .progress
            .on_progress(&ProgressEvent::StageStarted { stage: Stage::Preflight });
        let started = Instant::now();

        let preflight = Preflight::new(
            self.ctx.package_manager.as_ref(),
            self.ctx.disk_probe.as_ref(),
            self.ctx.file_system.as_ref(),
        )
        .with_tools(self.ctx.tools.clone());

        match preflight.check(&self.ctx.config) {
            Ok(ready) => {
                self.ctx.progress.on_progress(&ProgressEvent::StageComplete {
                    stage: Stage::Preflight,
                    attempts: 1,
                    duration: started.elapsed(),
                });
                let failed = ready.failed_tools();
                pipeline.record(if failed.is_empty() {
                    BuildResult::success(Stage::Preflight, 1, "environment ready")
                } else {
                    BuildResult::advisory(
                        Stage::Preflight,
                        format!("tools not installed: {}", failed.join(", ")),
                    )
                });
                Ok(ready)
            }
            Err(err) => {
                pipeline.record(BuildResult::fatal(Stage::Preflight, 1, err.to_string()));
                Err(err)
            }
        }
    }
}
