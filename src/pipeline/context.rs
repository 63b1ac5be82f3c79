//! Run context owning the configuration and every collaborator

use std::sync::Arc;

use crate::config::RunConfig;
use crate::exec::{CommandRunner, Sleeper, SystemCommandRunner, ThreadSleeper};
use crate::fs::{FileSystem, RealFileSystem};
use crate::preflight::{
    default_tools, DiskProbe, Homebrew, PackageManager, StatvfsProbe, ToolDependency,
};
use crate::progress::{LoggingHandler, ProgressHandler};
use crate::repair::RepairStage;
use crate::stacks::GeneratorRegistry;

pub struct RunContext {
    /// Immutable run configuration
    pub config: RunConfig,

    /// Runs setup, build, install and repair commands
    pub runner: Arc<dyn CommandRunner>,

    /// Backoff sleeps between retries
    pub sleeper: Arc<dyn Sleeper>,

    /// Used for tree generation and directory creation
    pub file_system: Arc<dyn FileSystem>,

    pub package_manager: Arc<dyn PackageManager>,

    pub disk_probe: Arc<dyn DiskProbe>,

    pub registry: Arc<GeneratorRegistry>,

    pub repair: Arc<RepairStage>,

    pub progress: Arc<dyn ProgressHandler>,

    /// Tools installed during preflight
    pub tools: Vec<ToolDependency>,
}

impl RunContext {
    /// Context backed by the real system
    pub fn new(config: RunConfig) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
        Self {
            config,
            package_manager: Arc::new(Homebrew::new(runner.clone())),
            runner,
            sleeper: Arc::new(ThreadSleeper),
            file_system: Arc::new(RealFileSystem::new()),
            disk_probe: Arc::new(StatvfsProbe),
            registry: Arc::new(GeneratorRegistry::with_defaults()),
            repair: Arc::new(RepairStage::with_defaults()),
            progress: Arc::new(LoggingHandler),
            tools: default_tools(),
        }
    }

    /// Replaces the command runner; the package manager becomes Homebrew over it
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.package_manager = Arc::new(Homebrew::new(runner.clone()));
        self.runner = runner;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_file_system(mut self, file_system: Arc<dyn FileSystem>) -> Self {
        self.file_system = file_system;
        self
    }

    pub fn with_package_manager(mut self, package_manager: Arc<dyn PackageManager>) -> Self {
        self.package_manager = package_manager;
        self
    }

    pub fn with_disk_probe(mut self, disk_probe: Arc<dyn DiskProbe>) -> Self {
        self.disk_probe = disk_probe;
        self
    }

    pub fn with_registry(mut self, registry: GeneratorRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_repair(mut self, repair: RepairStage) -> Self {
        self.repair = Arc::new(repair);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDependency>) -> Self {
        self.tools = tools;
        self
    }
}
