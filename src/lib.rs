//! framesmith - enterprise deployment framework scaffolder
//!
//! This library generates an organization-specific deployment framework tree
//! (build entrypoints, container and IaC stubs, CI manifests, service units and
//! per-stack service skeletons) and then drives the generated tree through a
//! setup, build, repair and package pipeline.
//!
//! # Core Concepts
//!
//! - **Run configuration**: one immutable [`RunConfig`] built once and passed to
//!   every stage
//! - **Generator registry**: maps an organization key to the stack generators
//!   that produce its payload
//! - **Pipeline**: a state machine (`Init -> Generated -> SetupDone -> Built ->
//!   Repaired -> Packaged -> Done`, or `Aborted`) driven by the orchestrator
//! - **Collaborators**: command runner, package manager, disk probe, file system
//!   and sleeper sit behind traits so every stage can be exercised in tests
//!
//! # Example Usage
//!
//! ```no_run
//! use framesmith::{Orchestrator, RunConfig, RunContext, RunSettings};
//!
//! let settings = RunSettings::from_env()?;
//! let config = RunConfig::new("Google", settings)?;
//! let report = Orchestrator::new(RunContext::new(config)).run()?;
//! println!("artifacts: {:?}", report.artifacts);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod fs;
pub mod package;
pub mod pipeline;
pub mod preflight;
pub mod progress;
pub mod repair;
pub mod scaffold;
pub mod stacks;
pub mod util;

pub use config::{ConfigError, RetryPolicy, RunConfig, RunSettings};
pub use error::FatalError;
pub use pipeline::{Orchestrator, PipelineState, RunContext, RunReport, StageTracker};
pub use stacks::{GenerationTask, GeneratorRegistry, StackId};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_framesmith() {
        assert_eq!(NAME, "framesmith");
    }
}
