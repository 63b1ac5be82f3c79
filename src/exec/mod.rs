//! Typed command invocation
//!
//! Commands are described by a program and an argument vector. Shell features
//! are only reachable through [`CommandSpec::Shell`], which is never the
//! default constructor.

mod mock;
mod retry;

pub use mock::{MockCommandRunner, MockOutcome};
pub use retry::{
    Exhausted, RecordingSleeper, RetryExecutor, RetrySuccess, RetryableCommand, Sleeper,
    ThreadSleeper,
};

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    /// A program with an explicit argument vector
    Exec {
        program: String,
        args: Vec<String>,
        cwd: Option<PathBuf>,
    },
    /// A script run through `/bin/sh -c`
    Shell { script: String, cwd: Option<PathBuf> },
}

impl CommandSpec {
    pub fn exec<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::Exec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    pub fn shell(script: impl Into<String>) -> Self {
        CommandSpec::Shell {
            script: script.into(),
            cwd: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = Some(dir.into());
        match &mut self {
            CommandSpec::Exec { cwd, .. } | CommandSpec::Shell { cwd, .. } => *cwd = dir,
        }
        self
    }

    /// Program that must be on `PATH` for this command to run
    pub fn program(&self) -> &str {
        match self {
            CommandSpec::Exec { program, .. } => program,
            CommandSpec::Shell { .. } => "sh",
        }
    }

    pub fn cwd(&self) -> Option<&Path> {
        match self {
            CommandSpec::Exec { cwd, .. } | CommandSpec::Shell { cwd, .. } => cwd.as_deref(),
        }
    }

    fn to_command(&self) -> Command {
        let mut command = match self {
            CommandSpec::Exec { program, args, .. } => {
                let mut command = Command::new(program);
                command.args(args);
                command
            }
            CommandSpec::Shell { script, .. } => {
                let mut command = Command::new("/bin/sh");
                command.arg("-c").arg(script);
                command
            }
        };
        if let Some(dir) = self.cwd() {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandSpec::Exec { program, args, .. } => {
                write!(f, "{}", program)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            CommandSpec::Shell { script, .. } => write!(f, "sh -c '{}'", script),
        }
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Stderr when present, otherwise stdout
    pub fn error_text(&self) -> String {
        if !self.stderr.trim().is_empty() {
            self.stderr.trim().to_string()
        } else {
            self.stdout.trim().to_string()
        }
    }

    /// One-line failure description for logs
    pub fn failure_summary(&self) -> String {
        let status = match self.status {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        let text = self.error_text();
        if text.is_empty() {
            status
        } else {
            format!("{}: {}", status, text)
        }
    }
}

/// Runs external processes
pub trait CommandRunner: Send + Sync {
    /// Runs to completion; `Err` means the process could not be started
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;

    /// Whether `program` resolves on `PATH`
    fn is_available(&self, program: &str) -> bool;
}

pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %command, cwd = ?command.cwd(), "Running command");
        let output = command
            .to_command()
            .output()
            .with_context(|| format!("Failed to start `{}`", command))?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
