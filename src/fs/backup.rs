//! Rename-aside backups
//!
//! Existing trees and artifacts are never merged or overwritten: they are
//! renamed to `<name>.backup-<timestamp>` first. When two backups land in the
//! same second a numeric suffix keeps the names distinct.

use super::FileSystem;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// First free backup path for `path` at `timestamp`
pub fn backup_path(fs: &dyn FileSystem, path: &Path, timestamp: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "backup".to_string());
    let base = format!("{}.backup-{}", name, timestamp);

    let mut candidate = path.with_file_name(&base);
    let mut counter = 1;
    while fs.exists(&candidate) {
        candidate = path.with_file_name(format!("{}-{}", base, counter));
        counter += 1;
    }
    candidate
}

/// Renames `path` aside if it exists, using the current local time
pub fn move_aside(fs: &dyn FileSystem, path: &Path) -> Result<Option<PathBuf>> {
    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    move_aside_at(fs, path, &timestamp)
}

/// Renames `path` aside if it exists; returns the backup location
pub fn move_aside_at(fs: &dyn FileSystem, path: &Path, timestamp: &str) -> Result<Option<PathBuf>> {
    if !fs.exists(path) {
        return Ok(None);
    }
    let target = backup_path(fs, path, timestamp);
    fs.rename(path, &target)?;
    info!(from = %path.display(), to = %target.display(), "Moved existing path aside");
    Ok(Some(target))
}
