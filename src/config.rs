//! Run configuration for framesmith
//!
//! A run is described by two values. [`RunSettings`] holds everything that does
//! not depend on the organization (root directory, version tag, retry policy,
//! disk threshold) and is the only place the process environment is read.
//! [`RunConfig`] adds the organization and derives every path the pipeline
//! writes to. Once built, a `RunConfig` is never mutated; stages receive it by
//! reference.
//!
//! # Environment Variables
//!
//! - `FRAMESMITH_ROOT`: Root working directory - default: current directory
//! - `FRAMESMITH_VERSION`: Version tag used in artifact and log names - default: "v1.0.0"
//! - `FRAMESMITH_MAX_ATTEMPTS`: Attempts for setup and build commands - default: "3"
//! - `FRAMESMITH_INITIAL_BACKOFF_MS`: First retry delay in milliseconds - default: "2000"
//!
//! # Example
//!
//! ```no_run
//! use framesmith::{RunConfig, RunSettings};
//!
//! let settings = RunSettings::from_env()?;
//! let config = RunConfig::new("google", settings)?;
//! assert_eq!(config.org_key(), "GOOGLE");
//! assert!(config.framework_dir().ends_with("GOOGLE_enterprise_framework"));
//! # Ok::<(), framesmith::ConfigError>(())
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_VERSION: &str = "v1.0.0";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 2000;
pub const DEFAULT_DISK_THRESHOLD_PERCENT: f64 = 90.0;

/// Suffix appended to the organization key to name the framework directory
pub const FRAMEWORK_SUFFIX: &str = "_enterprise_framework";

/// Directory under the root that receives the archives
pub const ARTIFACT_DIR_NAME: &str = "artifacts";

const MAX_ORGANIZATION_LEN: usize = 64;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Organization argument missing or blank
    #[error("Organization name is required")]
    MissingOrganization,

    /// Organization contains characters that cannot appear in a directory name
    #[error("Invalid organization name '{0}': use letters, digits, '-' or '_' (at most 64 characters)")]
    InvalidOrganization(String),

    /// Version tag is empty or path-unsafe
    #[error("Invalid version tag '{0}'")]
    InvalidVersion(String),

    /// Failed to parse a configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    /// The current directory could not be determined
    #[error("Unable to determine working directory: {0}")]
    WorkingDirectory(#[from] std::io::Error),
}

/// Bounded exponential backoff used for setup and build commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
        }
    }

    /// Delay slept after the failed attempt with the given zero-based index
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }
}

/// Organization-independent settings for a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub root_dir: PathBuf,
    pub version: String,
    pub retry: RetryPolicy,
    pub disk_threshold_percent: f64,
}

impl RunSettings {
    /// Settings rooted at `root_dir` with default version, retry policy and threshold
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            version: DEFAULT_VERSION.to_string(),
            retry: RetryPolicy::default(),
            disk_threshold_percent: DEFAULT_DISK_THRESHOLD_PERCENT,
        }
    }

    /// Loads settings from `FRAMESMITH_*` environment variables with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_attempts = parse_env("FRAMESMITH_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        let backoff_ms = parse_env("FRAMESMITH_INITIAL_BACKOFF_MS", DEFAULT_INITIAL_BACKOFF_MS)?;

        let settings = Self::base_from_env()?
            .with_retry(RetryPolicy::new(max_attempts, Duration::from_millis(backoff_ms)));
        settings.validate()?;
        Ok(settings)
    }

    /// Root and version only; enough to place the run log when the rest is malformed
    pub fn base_from_env() -> Result<Self, ConfigError> {
        let root_dir = match env::var("FRAMESMITH_ROOT") {
            Ok(root) if !root.trim().is_empty() => PathBuf::from(root),
            _ => env::current_dir()?,
        };

        let version = env::var("FRAMESMITH_VERSION")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());

        Ok(Self::new(root_dir).with_version(version))
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run-scoped log file, named after the version tag
    pub fn log_file(&self) -> PathBuf {
        self.root_dir.join(format!("framesmith_{}.log", self.version))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let version_ok = !self.version.is_empty()
            && self
                .version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !version_ok {
            return Err(ConfigError::InvalidVersion(self.version.clone()));
        }

        if !(self.disk_threshold_percent > 0.0 && self.disk_threshold_percent <= 100.0) {
            return Err(ConfigError::ParseError {
                field: "disk threshold".to_string(),
                error: format!("{} is outside (0, 100]", self.disk_threshold_percent),
            });
        }

        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse::<T>().map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Immutable configuration for one framesmith run
#[derive(Debug, Clone)]
pub struct RunConfig {
    organization: String,
    org_key: String,
    root_dir: PathBuf,
    framework_dir: PathBuf,
    artifact_dir: PathBuf,
    log_file: PathBuf,
    version: String,
    retry: RetryPolicy,
    disk_threshold_percent: f64,
}

impl RunConfig {
    /// Builds the configuration for `organization` (any case) from `settings`
    pub fn new(organization: &str, settings: RunSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let organization = organization.trim();
        if organization.is_empty() {
            return Err(ConfigError::MissingOrganization);
        }
        let valid = organization.len() <= MAX_ORGANIZATION_LEN
            && organization
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !valid {
            return Err(ConfigError::InvalidOrganization(organization.to_string()));
        }

        let org_key = normalize_org_key(organization);
        let log_file = settings.log_file();
        let RunSettings {
            root_dir,
            version,
            retry,
            disk_threshold_percent,
        } = settings;

        Ok(Self {
            organization: organization.to_string(),
            framework_dir: root_dir.join(format!("{}{}", org_key, FRAMEWORK_SUFFIX)),
            artifact_dir: root_dir.join(ARTIFACT_DIR_NAME),
            org_key,
            root_dir,
            log_file,
            version,
            retry,
            disk_threshold_percent,
        })
    }

    /// Organization name as given on the command line (trimmed)
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Upper-cased organization key used for dispatch and naming
    pub fn org_key(&self) -> &str {
        &self.org_key
    }

    /// Lower-cased organization slug for payload identifiers
    pub fn org_slug(&self) -> String {
        self.org_key.to_lowercase()
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn framework_dir(&self) -> &Path {
        &self.framework_dir
    }

    /// Directory name of the framework tree, used as the archive root
    pub fn framework_name(&self) -> String {
        format!("{}{}", self.org_key, FRAMEWORK_SUFFIX)
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn disk_threshold_percent(&self) -> f64 {
        self.disk_threshold_percent
    }

    /// Base file name shared by both archives: `${ORG}_enterprise_framework_${VERSION}`
    pub fn artifact_stem(&self) -> String {
        format!("{}_{}", self.framework_name(), self.version)
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Framesmith Configuration:")?;
        writeln!(f, "  Organization: {} ({})", self.organization, self.org_key)?;
        writeln!(f, "  Root: {}", self.root_dir.display())?;
        writeln!(f, "  Framework: {}", self.framework_dir.display())?;
        writeln!(f, "  Artifacts: {}", self.artifact_dir.display())?;
        writeln!(f, "  Log File: {}", self.log_file.display())?;
        writeln!(f, "  Version: {}", self.version)?;
        writeln!(
            f,
            "  Retry: {} attempt(s), initial backoff {:?}",
            self.retry.max_attempts, self.retry.initial_backoff
        )?;
        Ok(())
    }
}

/// Case-folds an organization name into its registry key
pub fn normalize_org_key(organization: &str) -> String {
    organization.trim().to_ascii_uppercase()
}
