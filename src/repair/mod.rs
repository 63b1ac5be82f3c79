//! Best-effort repair of generated artifacts
//!
//! A fixer reports a [`RepairOutcome`] value. Nothing here returns a
//! `Result`, so a failing fixer cannot abort the run.

mod container;
mod playbook;

pub use container::ContainerSmokeTest;
pub use playbook::PlaybookLintFixer;

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

use crate::exec::CommandRunner;
use crate::progress::{ProgressEvent, ProgressHandler};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum RepairOutcome {
    Applied(String),
    /// The fixer's tool is not available
    Skipped(String),
    Failed(String),
}

impl RepairOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RepairOutcome::Applied(_))
    }

    pub fn detail(&self) -> &str {
        match self {
            RepairOutcome::Applied(d) | RepairOutcome::Skipped(d) | RepairOutcome::Failed(d) => d,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RepairOutcome::Applied(_) => "applied",
            RepairOutcome::Skipped(_) => "skipped",
            RepairOutcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for RepairOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.detail())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub fixer: String,
    #[serde(flatten)]
    pub outcome: RepairOutcome,
}

pub trait Fixer: Send + Sync {
    fn name(&self) -> &str;

    fn repair(&self, tree: &Path, runner: &dyn CommandRunner) -> RepairOutcome;
}

pub struct RepairStage {
    fixers: Vec<Box<dyn Fixer>>,
}

impl RepairStage {
    pub fn new(fixers: Vec<Box<dyn Fixer>>) -> Self {
        Self { fixers }
    }

    /// Playbook lint-fix followed by the container smoke test
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(PlaybookLintFixer),
            Box::new(ContainerSmokeTest::new()),
        ])
    }

    /// Runs every fixer in order, reporting each outcome to `progress`
    pub fn run(
        &self,
        tree: &Path,
        runner: &dyn CommandRunner,
        progress: &dyn ProgressHandler,
    ) -> Vec<RepairReport> {
        self.fixers
            .iter()
            .map(|fixer| {
                let outcome = fixer.repair(tree, runner);
                match &outcome {
                    RepairOutcome::Applied(detail) => info!("{}: {}", fixer.name(), detail),
                    RepairOutcome::Skipped(detail) | RepairOutcome::Failed(detail) => {
                        warn!("{} {}: {}", fixer.name(), outcome.label(), detail)
                    }
                }
                progress.on_progress(&ProgressEvent::RepairReported {
                    fixer: fixer.name().to_string(),
                    outcome: outcome.to_string(),
                    success: outcome.is_applied(),
                });
                RepairReport {
                    fixer: fixer.name().to_string(),
                    outcome,
                }
            })
            .collect()
    }
}

impl Default for RepairStage {
    fn default() -> Self {
        Self::with_defaults()
    }
}
