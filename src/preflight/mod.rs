//! Environment checks that gate generation
//!
//! The package manager bootstrap, the disk threshold and the artifact
//! directory are fatal checks evaluated once. Individual tool installs are
//! advisory.

mod disk;
mod package_manager;

pub use disk::{DiskProbe, DiskUsage, FixedDiskProbe, StatvfsProbe};
pub use package_manager::{
    default_tools, Homebrew, InstallOutcome, PackageManager, ToolDependency,
};

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::FatalError;
use crate::fs::FileSystem;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolStatus {
    pub program: String,
    pub outcome: InstallOutcome,
}

/// Proof that preflight passed
#[derive(Debug, Clone, PartialEq)]
pub struct Ready {
    /// The package manager had to be installed during this run
    pub bootstrapped: bool,
    pub tools: Vec<ToolStatus>,
    pub disk_usage_percent: f64,
}

impl Ready {
    pub fn failed_tools(&self) -> Vec<&str> {
        self.tools
            .iter()
            .filter(|t| t.outcome.is_failure())
            .map(|t| t.program.as_str())
            .collect()
    }
}

pub struct Preflight<'a> {
    package_manager: &'a dyn PackageManager,
    disk: &'a dyn DiskProbe,
    fs: &'a dyn FileSystem,
    tools: Vec<ToolDependency>,
}

impl<'a> Preflight<'a> {
    pub fn new(
        package_manager: &'a dyn PackageManager,
        disk: &'a dyn DiskProbe,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self {
            package_manager,
            disk,
            fs,
            tools: default_tools(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDependency>) -> Self {
        self.tools = tools;
        self
    }

    pub fn check(&self, config: &RunConfig) -> Result<Ready, FatalError> {
        let bootstrapped = self.ensure_package_manager()?;
        let tools = self.install_tools();
        let disk_usage_percent = self.check_disk(config)?;
        self.ensure_artifact_dir(config.artifact_dir())?;

        info!("Preflight passed");
        Ok(Ready {
            bootstrapped,
            tools,
            disk_usage_percent,
        })
    }

    fn ensure_package_manager(&self) -> Result<bool, FatalError> {
        let manager = self.package_manager.name();
        if self.package_manager.is_available() {
            info!("Package manager {} is available", manager);
            return Ok(false);
        }

        warn!("Package manager {} not found, installing", manager);
        self.package_manager
            .bootstrap()
            .map_err(|source| FatalError::Bootstrap {
                manager: manager.to_string(),
                source,
            })?;
        info!("Package manager {} installed", manager);
        Ok(true)
    }

    fn install_tools(&self) -> Vec<ToolStatus> {
        self.tools
            .iter()
            .map(|tool| {
                let outcome = self.package_manager.ensure_installed(tool);
                match &outcome {
                    InstallOutcome::Failed(reason) => {
                        warn!("Failed to install {}: {}", tool.program, reason)
                    }
                    other => info!("Dependency {}: {}", tool.program, other),
                }
                ToolStatus {
                    program: tool.program.clone(),
                    outcome,
                }
            })
            .collect()
    }

    fn check_disk(&self, config: &RunConfig) -> Result<f64, FatalError> {
        let probe_path = self.nearest_existing(config.root_dir());
        let usage = self
            .disk
            .usage(&probe_path)
            .map_err(|source| FatalError::DiskProbe {
                path: probe_path.clone(),
                source,
            })?;

        let percent = usage.percent_used();
        let threshold = config.disk_threshold_percent();
        if percent >= threshold {
            return Err(FatalError::DiskUsage {
                path: probe_path,
                usage: percent,
                threshold,
            });
        }

        info!(
            "Disk usage of {} is {:.1}% (threshold {:.0}%)",
            probe_path.display(),
            percent,
            threshold
        );
        Ok(percent)
    }

    /// The root may not exist yet; measure the closest ancestor that does.
    /// A relative root ends at the working directory.
    fn nearest_existing(&self, path: &Path) -> PathBuf {
        path.ancestors()
            .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
            .find(|p| self.fs.exists(p))
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"))
    }

    fn ensure_artifact_dir(&self, dir: &Path) -> Result<(), FatalError> {
        self.fs
            .create_dir_all(dir)
            .map_err(|source| FatalError::DirectoryCreation {
                path: dir.to_path_buf(),
                source,
            })?;
        info!("Artifact directory ready at {}", dir.display());
        Ok(())
    }
}
