//! Framework tree generation
//!
//! The common scaffold is written first and unconditionally, then each stack
//! strategy of the resolved [`GenerationTask`] in order. Files are never
//! checked for prior existence: the tree is always fresh or backed up.

pub mod attribution;
mod templates;
mod tree;

pub use templates::{common_files, BUILD_ENTRYPOINT, DOCKERFILE_PATH, PLAYBOOK_PATH};
pub use tree::{FrameworkTree, TreeWriter};

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{normalize_org_key, RunConfig};
use crate::error::FatalError;
use crate::fs::FileSystem;
use crate::stacks::GenerationTask;

/// One file to write, relative to the framework directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
    pub executable: bool,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            executable: false,
        }
    }

    pub fn executable(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            executable: true,
            ..Self::new(path, contents)
        }
    }
}

/// What every generator sees of the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub framework_dir: PathBuf,
    pub framework_name: String,
    pub organization: String,
    pub org_key: String,
    pub version: String,
}

impl GenerationContext {
    pub fn new(
        framework_dir: impl Into<PathBuf>,
        organization: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let framework_dir = framework_dir.into();
        let organization = organization.into();
        Self {
            framework_name: dir_name(&framework_dir),
            org_key: normalize_org_key(&organization),
            framework_dir,
            organization,
            version: version.into(),
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            framework_dir: config.framework_dir().to_path_buf(),
            framework_name: config.framework_name(),
            organization: config.organization().to_string(),
            org_key: config.org_key().to_string(),
            version: config.version().to_string(),
        }
    }

    pub fn org_slug(&self) -> String {
        self.org_key.to_lowercase()
    }

    /// Substitutes `{{organization}}`, `{{org}}`, `{{org_slug}}`,
    /// `{{version}}` and `{{framework}}`
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{{organization}}", &self.organization)
            .replace("{{org_slug}}", &self.org_slug())
            .replace("{{org}}", &self.org_key)
            .replace("{{version}}", &self.version)
            .replace("{{framework}}", &self.framework_name)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Produces the organization-independent base tree
pub struct CommonScaffoldGenerator;

impl CommonScaffoldGenerator {
    pub fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile> {
        common_files(ctx)
    }

    /// Prepares the tree and writes the common scaffold into it
    pub fn generate(
        &self,
        fs: &dyn FileSystem,
        config: &RunConfig,
    ) -> Result<FrameworkTree, FatalError> {
        let ctx = GenerationContext::from_config(config);
        let mut tree = FrameworkTree::prepare(fs, config.framework_dir())?;
        TreeWriter::new(fs, &ctx).write_all(&mut tree, &self.files(&ctx))?;
        info!("Common scaffold written ({} files)", tree.files.len());
        Ok(tree)
    }
}

/// Generates the full tree: common scaffold, then every stack of `task`
pub fn generate(
    fs: &dyn FileSystem,
    config: &RunConfig,
    task: &GenerationTask,
) -> Result<FrameworkTree, FatalError> {
    let mut tree = CommonScaffoldGenerator.generate(fs, config)?;

    let ctx = GenerationContext::from_config(config);
    let writer = TreeWriter::new(fs, &ctx);
    for strategy in &task.strategies {
        let files = strategy.files(&ctx);
        writer.write_all(&mut tree, &files)?;
        info!(
            stack = %strategy.id(),
            "{} skeleton generated ({} files)",
            strategy.id().name(),
            files.len()
        );
    }

    Ok(tree)
}
