//! Run pipeline: state machine, stage sequencing and orchestration

mod build;
mod context;
mod guard;
mod orchestrator;
mod report;
mod result;
mod state;

pub use build::{build_command, setup_command, BuildPipeline};
pub use context::RunContext;
pub use guard::{log_interrupted, RunGuard};
pub use orchestrator::Orchestrator;
pub use report::RunReport;
pub use result::{BuildResult, Outcome, Stage};
pub use state::{PipelineState, StageTracker, StateMachine, TransitionError};
