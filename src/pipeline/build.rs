//! Stage sequencing over the state machine
//!
//! Each stage either advances the machine to its successor or returns a
//! [`FatalError`]; [`BuildPipeline::execute`] then moves the machine to
//! `Aborted`. Repair has no failure path.

use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

use super::{BuildResult, PipelineState, RunContext, RunReport, Stage, StateMachine};
use crate::error::FatalError;
use crate::exec::{CommandSpec, RetryExecutor, RetryableCommand};
use crate::package::{PackageOutput, Packager};
use crate::preflight::Ready;
use crate::progress::ProgressEvent;
use crate::repair::RepairReport;
use crate::scaffold::{self, FrameworkTree, BUILD_ENTRYPOINT};
use crate::stacks::GenerationTask;

pub fn setup_command(tree: &Path) -> CommandSpec {
    CommandSpec::exec("make", ["setup"]).in_dir(tree)
}

pub fn build_command(tree: &Path) -> CommandSpec {
    CommandSpec::exec("bash", [BUILD_ENTRYPOINT]).in_dir(tree)
}

pub struct BuildPipeline<'a> {
    ctx: &'a RunContext,
    machine: StateMachine,
    results: Vec<BuildResult>,
    preflight: Option<Ready>,
    tree: Option<FrameworkTree>,
    repairs: Vec<RepairReport>,
    package: Option<PackageOutput>,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(ctx: &'a RunContext, machine: StateMachine) -> Self {
        Self {
            ctx,
            machine,
            results: Vec::new(),
            preflight: None,
            tree: None,
            repairs: Vec::new(),
            package: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.machine.state()
    }

    /// Records a stage that ran outside the pipeline, such as preflight
    pub fn record(&mut self, result: BuildResult) {
        self.results.push(result);
    }

    pub fn with_preflight(mut self, ready: Ready) -> Self {
        self.preflight = Some(ready);
        self
    }

    /// Aborts the machine and hands the error back for propagation
    pub fn abort(&mut self, err: FatalError) -> FatalError {
        let from = self.machine.abort();
        if from != self.machine.state() {
            self.ctx.progress.on_progress(&ProgressEvent::StateChanged {
                from,
                to: self.machine.state(),
            });
        }
        error!("Pipeline aborted in state {}: {}", from, err);
        err
    }

    /// Runs generate, setup, build, repair and package to `Done`
    pub fn execute(mut self, task: &GenerationTask) -> Result<RunReport, FatalError> {
        match self.run_stages(task) {
            Ok(()) => Ok(self.into_report(task)),
            Err(err) => Err(self.abort(err)),
        }
    }

    fn run_stages(&mut self, task: &GenerationTask) -> Result<(), FatalError> {
        self.generate(task)?;
        let tree = self.ctx.config.framework_dir().to_path_buf();
        self.retried(Stage::Setup, setup_command(&tree), PipelineState::SetupDone)?;
        self.retried(Stage::Build, build_command(&tree), PipelineState::Built)?;
        self.repair(&tree)?;
        self.package(&tree, task)?;
        self.advance(PipelineState::Done)
    }

    fn generate(&mut self, task: &GenerationTask) -> Result<(), FatalError> {
        let started = self.begin(Stage::Generate);
        let tree = scaffold::generate(self.ctx.file_system.as_ref(), &self.ctx.config, task)
            .map_err(|err| self.fail(Stage::Generate, 1, err))?;

        let diagnostic = format!("{} files written", tree.files.len());
        self.tree = Some(tree);
        self.complete(Stage::Generate, 1, diagnostic, started);
        self.advance(PipelineState::Generated)
    }

    fn retried(
        &mut self,
        stage: Stage,
        command: CommandSpec,
        next: PipelineState,
    ) -> Result<(), FatalError> {
        let started = self.begin(stage);
        let executor = RetryExecutor::new(self.ctx.runner.clone(), self.ctx.sleeper.clone())
            .with_progress(self.ctx.progress.clone());
        let retryable = RetryableCommand::new(command, self.ctx.config.retry());

        match executor.run(&retryable) {
            Ok(success) => {
                let diagnostic = format!("`{}` succeeded", retryable.command);
                self.complete(stage, success.attempts, diagnostic, started);
                self.advance(next)
            }
            Err(exhausted) => {
                let attempts = exhausted.attempts;
                let err = FatalError::RetriesExhausted {
                    stage,
                    command: exhausted.command,
                    attempts,
                    last_error: exhausted.last_error,
                };
                Err(self.fail(stage, attempts, err))
            }
        }
    }

    fn repair(&mut self, tree: &Path) -> Result<(), FatalError> {
        let started = self.begin(Stage::Repair);
        let reports = self
            .ctx
            .repair
            .run(tree, self.ctx.runner.as_ref(), self.ctx.progress.as_ref());

        let applied = reports.iter().filter(|r| r.outcome.is_applied()).count();
        let diagnostic = format!("{}/{} fixers applied", applied, reports.len());
        if applied == reports.len() {
            self.complete(Stage::Repair, 1, diagnostic, started);
        } else {
            self.results.push(BuildResult::advisory(Stage::Repair, diagnostic));
        }
        self.repairs = reports;
        self.advance(PipelineState::Repaired)
    }

    fn package(&mut self, tree: &Path, task: &GenerationTask) -> Result<(), FatalError> {
        let started = self.begin(Stage::Package);
        let output = Packager::new()
            .package(&self.ctx.config, tree, &task.stacks())
            .map_err(|err| self.fail(Stage::Package, 1, err))?;

        let diagnostic = format!("{} files in 2 archives", output.manifest.len());
        self.package = Some(output);
        self.complete(Stage::Package, 1, diagnostic, started);
        self.advance(PipelineState::Packaged)
    }

    fn advance(&mut self, next: PipelineState) -> Result<(), FatalError> {
        let from = self.machine.state();
        self.machine.transition(next)?;
        info!("Pipeline state {} -> {}", from, next);
        self.ctx
            .progress
            .on_progress(&ProgressEvent::StateChanged { from, to: next });
        Ok(())
    }

    fn begin(&self, stage: Stage) -> Instant {
        if let Some(tracker) = self.machine.tracker() {
            tracker.enter(stage);
        }
        self.ctx
            .progress
            .on_progress(&ProgressEvent::StageStarted { stage });
        Instant::now()
    }

    fn complete(&mut self, stage: Stage, attempts: u32, diagnostic: String, started: Instant) {
        self.ctx.progress.on_progress(&ProgressEvent::StageComplete {
            stage,
            attempts,
            duration: started.elapsed(),
        });
        self.results
            .push(BuildResult::success(stage, attempts, diagnostic));
    }

    fn fail(&mut self, stage: Stage, attempts: u32, err: FatalError) -> FatalError {
        self.results
            .push(BuildResult::fatal(stage, attempts, err.to_string()));
        err
    }

    fn into_report(self, task: &GenerationTask) -> RunReport {
        let config = &self.ctx.config;
        let (backup, framework_dir) = match &self.tree {
            Some(tree) => (tree.backup.clone(), tree.root.clone()),
            None => (None, config.framework_dir().to_path_buf()),
        };
        let (manifest_files, artifacts, index) = match self.package {
            Some(output) => (
                output.manifest.files.clone(),
                output.artifacts(),
                output.index,
            ),
            None => (Vec::new(), Vec::new(), config.artifact_dir().to_path_buf()),
        };

        RunReport {
            organization: config.organization().to_string(),
            org_key: config.org_key().to_string(),
            final_state: self.machine.state(),
            history: self.machine.history().to_vec(),
            stacks: task.stacks(),
            stage_results: self.results,
            repairs: self.repairs,
            framework_dir,
            backup,
            manifest_files,
            artifacts,
            index,
            preflight: self.preflight,
        }
    }
}
