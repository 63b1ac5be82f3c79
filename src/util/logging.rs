//! Structured logging setup for framesmith
//!
//! Every run logs through the `tracing` ecosystem into two sinks at once:
//!
//! - the console, where WARN and ERROR go to stderr and everything else to
//!   stdout
//! - the run log file, opened once in append mode and written without ANSI
//!   colors
//!
//! Each line carries a timestamp and a severity tag. The default level is
//! INFO; `FRAMESMITH_LOG_LEVEL` changes it and `RUST_LOG` overrides the filter
//! entirely.
//!
//! # Example
//!
//! ```no_run
//! use framesmith::util::{init_logging, LoggingConfig};
//! use tracing::{info, warn};
//!
//! init_logging(LoggingConfig::from_env().with_log_file("framesmith_v1.0.0.log"))?;
//!
//! info!(organization = "GOOGLE", "Starting framework run");
//! warn!(tool = "terraform", "Dependency install failed, continuing");
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Include the module target (e.g., framesmith::pipeline) in logs
    pub include_target: bool,

    /// Run log file; every event is appended to it when set
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            include_target: false,
            log_file: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Reads `FRAMESMITH_LOG_LEVEL` (trace, debug, info, warn, error)
    pub fn from_env() -> Self {
        let level_str = env::var("FRAMESMITH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        Self::with_level(parse_level(&level_str))
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_target(mut self, include_target: bool) -> Self {
        self.include_target = include_target;
        self
    }
}

/// Parses a log level from a string, falling back to INFO
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Initializes the process-wide subscriber
///
/// Only the first call installs anything; later calls return `Ok(())`.
/// Fails when the log file cannot be opened or another subscriber is already
/// installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = install(&config);
    });
    result
}

fn install(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.level).into())
        .from_env_lossy();

    let console_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);
    let console_layer = fmt::layer()
        .with_target(config.include_target)
        .with_writer(console_writer);

    let file_layer = match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(config.include_target)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")
}
