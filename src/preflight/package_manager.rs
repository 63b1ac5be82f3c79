//! Package manager collaborator used to install external tools

use anyhow::{bail, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::exec::{CommandRunner, CommandSpec};

const HOMEBREW_INSTALL_SCRIPT: &str = "NONINTERACTIVE=1 /bin/bash -c \"$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)\"";

/// An external executable the generated framework relies on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDependency {
    /// Executable looked up on `PATH`
    pub program: String,
    /// Package that provides it
    pub package: String,
}

impl ToolDependency {
    pub fn new(program: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            package: package.into(),
        }
    }

    /// Tool and package share a name
    pub fn named(name: &str) -> Self {
        Self::new(name, name)
    }
}

/// Tools installed during preflight
pub fn default_tools() -> Vec<ToolDependency> {
    vec![
        ToolDependency::named("git"),
        ToolDependency::named("make"),
        ToolDependency::named("jq"),
        ToolDependency::named("terraform"),
        ToolDependency::named("ansible"),
        ToolDependency::named("ansible-lint"),
        ToolDependency::named("docker"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Already on `PATH`
    Present,
    Installed,
    /// Install attempted and failed; advisory only
    Failed(String),
}

impl InstallOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, InstallOutcome::Failed(_))
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Present => write!(f, "present"),
            InstallOutcome::Installed => write!(f, "installed"),
            InstallOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

pub trait PackageManager: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the package manager itself is usable
    fn is_available(&self) -> bool;

    /// Installs the package manager; an error here is fatal to the run
    fn bootstrap(&self) -> Result<()>;

    /// Installs `tool` unless it is already present. Never fails the run.
    fn ensure_installed(&self, tool: &ToolDependency) -> InstallOutcome;
}

/// Homebrew driven through a [`CommandRunner`]
pub struct Homebrew {
    runner: Arc<dyn CommandRunner>,
}

impl Homebrew {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl PackageManager for Homebrew {
    fn name(&self) -> &str {
        "brew"
    }

    fn is_available(&self) -> bool {
        self.runner.is_available("brew")
    }

    fn bootstrap(&self) -> Result<()> {
        info!("Installing Homebrew");
        let output = self.runner.run(&CommandSpec::shell(HOMEBREW_INSTALL_SCRIPT))?;
        if !output.success() {
            bail!("Homebrew install script failed ({})", output.failure_summary());
        }
        if !self.is_available() {
            bail!("Homebrew install script finished but `brew` is not on PATH");
        }
        Ok(())
    }

    fn ensure_installed(&self, tool: &ToolDependency) -> InstallOutcome {
        if self.runner.is_available(&tool.program) {
            debug!("{} already present", tool.program);
            return InstallOutcome::Present;
        }

        let install = CommandSpec::exec("brew", ["install", tool.package.as_str()]);
        match self.runner.run(&install) {
            Ok(output) if output.success() => InstallOutcome::Installed,
            Ok(output) => InstallOutcome::Failed(output.failure_summary()),
            Err(e) => InstallOutcome::Failed(format!("{:#}", e)),
        }
    }
}
