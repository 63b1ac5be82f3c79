//! Per-stage results inspected by the build pipeline

use serde::Serialize;
use std::fmt;

/// Pipeline stage that produced a [`BuildResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preflight,
    Generate,
    Setup,
    Build,
    Repair,
    Package,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Preflight => "preflight",
            Stage::Generate => "generate",
            Stage::Setup => "setup",
            Stage::Build => "build",
            Stage::Repair => "repair",
            Stage::Package => "package",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    FatalFailure,
    AdvisoryFailure,
}

impl Outcome {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::FatalFailure)
    }
}

/// What one stage invocation produced; logged, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    pub stage: Stage,
    pub outcome: Outcome,
    pub diagnostic: String,
    pub attempts: u32,
}

impl BuildResult {
    pub fn success(stage: Stage, attempts: u32, diagnostic: impl Into<String>) -> Self {
        Self {
            stage,
            outcome: Outcome::Success,
            diagnostic: diagnostic.into(),
            attempts,
        }
    }

    pub fn fatal(stage: Stage, attempts: u32, diagnostic: impl Into<String>) -> Self {
        Self {
            stage,
            outcome: Outcome::FatalFailure,
            diagnostic: diagnostic.into(),
            attempts,
        }
    }

    pub fn advisory(stage: Stage, diagnostic: impl Into<String>) -> Self {
        Self {
            stage,
            outcome: Outcome::AdvisoryFailure,
            diagnostic: diagnostic.into(),
            attempts: 1,
        }
    }
}
