use serde::Serialize;
use std::path::PathBuf;

use super::{BuildResult, PipelineState};
use crate::package::Artifact;
use crate::preflight::Ready;
use crate::repair::RepairReport;
use crate::stacks::StackId;

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub organization: String,
    pub org_key: String,
    pub final_state: PipelineState,
    pub history: Vec<PipelineState>,
    pub stacks: Vec<StackId>,
    pub stage_results: Vec<BuildResult>,
    pub repairs: Vec<RepairReport>,
    pub framework_dir: PathBuf,
    /// Where a previous tree was moved before generation
    pub backup: Option<PathBuf>,
    pub manifest_files: Vec<String>,
    pub artifacts: Vec<Artifact>,
    pub index: PathBuf,
    #[serde(skip)]
    pub preflight: Option<Ready>,
}

impl RunReport {
    pub fn is_done(&self) -> bool {
        self.final_state == PipelineState::Done
    }

    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        self.artifacts.iter().map(|a| a.path.clone()).collect()
    }
}
