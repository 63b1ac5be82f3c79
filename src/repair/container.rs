use std::path::Path;

use super::{Fixer, RepairOutcome};
use crate::exec::{CommandRunner, CommandSpec};
use crate::scaffold::DOCKERFILE_PATH;

/// Builds the generated Dockerfile to check that it parses and resolves
pub struct ContainerSmokeTest {
    tag: String,
}

impl ContainerSmokeTest {
    pub fn new() -> Self {
        Self {
            tag: "framesmith-smoke-test".to_string(),
        }
    }

    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Default for ContainerSmokeTest {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixer for ContainerSmokeTest {
    fn name(&self) -> &str {
        "container-smoke-test"
    }

    fn repair(&self, tree: &Path, runner: &dyn CommandRunner) -> RepairOutcome {
        if !runner.is_available("docker") {
            return RepairOutcome::Skipped("docker not installed".to_string());
        }

        // A CLI without a reachable daemon is as good as no docker
        match runner.run(&CommandSpec::exec("docker", ["info"])) {
            Ok(output) if output.success() => {}
            Ok(output) => {
                return RepairOutcome::Skipped(format!(
                    "docker daemon unavailable ({})",
                    output.failure_summary()
                ))
            }
            Err(e) => return RepairOutcome::Skipped(format!("docker daemon unavailable: {:#}", e)),
        }

        let build = CommandSpec::exec(
            "docker",
            ["build", "-f", DOCKERFILE_PATH, "-t", self.tag.as_str(), "."],
        )
        .in_dir(tree);
        match runner.run(&build) {
            Ok(output) if output.success() => {
                RepairOutcome::Applied(format!("{} builds as {}", DOCKERFILE_PATH, self.tag))
            }
            Ok(output) => RepairOutcome::Failed(output.failure_summary()),
            Err(e) => RepairOutcome::Failed(format!("{:#}", e)),
        }
    }
}
