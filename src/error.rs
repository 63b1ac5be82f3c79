//! Run-terminating errors
//!
//! Everything in this module aborts the run: the pipeline moves to `Aborted`
//! and the process exits 1. Advisory problems (a tool that fails to install, a
//! repair fixer that fails) never become a `FatalError`; they are logged where
//! they happen.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::{Stage, TransitionError};

#[derive(Debug, Error)]
pub enum FatalError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Unsupported organization: {name} (supported: {})", .supported.join(", "))]
    UnsupportedOrganization { name: String, supported: Vec<String> },

    #[error("Organization {organization} references stack '{stack}' with no registered generator")]
    MissingGenerator { organization: String, stack: String },

    #[error("Package manager {manager} is unavailable and could not be installed: {source:#}")]
    Bootstrap {
        manager: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Disk usage of {} is {usage:.1}%, at or above the {threshold:.0}% threshold", .path.display())]
    DiskUsage {
        path: PathBuf,
        usage: f64,
        threshold: f64,
    },

    #[error("Unable to determine disk usage of {}: {source:#}", .path.display())]
    DiskProbe {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to create directory {}: {source:#}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("{stage} stage exhausted {attempts} attempt(s) of `{command}`: {last_error}")]
    RetriesExhausted {
        stage: Stage,
        command: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Generation failed at {}: {source:#}", .path.display())]
    Generation {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Packaging failed: {0:#}")]
    Packaging(#[source] anyhow::Error),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl FatalError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        1
    }
}
