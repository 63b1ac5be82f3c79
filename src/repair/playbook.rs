use std::path::Path;

use super::{Fixer, RepairOutcome};
use crate::exec::{CommandRunner, CommandSpec};
use crate::scaffold::PLAYBOOK_PATH;

const LINTER: &str = "ansible-lint";

/// Runs `ansible-lint --fix` over the generated playbook
pub struct PlaybookLintFixer;

impl Fixer for PlaybookLintFixer {
    fn name(&self) -> &str {
        "playbook-lint"
    }

    fn repair(&self, tree: &Path, runner: &dyn CommandRunner) -> RepairOutcome {
        if !runner.is_available(LINTER) {
            return RepairOutcome::Skipped(format!("{} not installed", LINTER));
        }

        let command = CommandSpec::exec(LINTER, ["--fix", PLAYBOOK_PATH]).in_dir(tree);
        match runner.run(&command) {
            Ok(output) if output.success() => {
                RepairOutcome::Applied(format!("{} is lint-clean", PLAYBOOK_PATH))
            }
            Ok(output) => RepairOutcome::Failed(output.failure_summary()),
            Err(e) => RepairOutcome::Failed(format!("{:#}", e)),
        }
    }
}
