//! Packaging of the framework tree
//!
//! The manifest is written into the tree first, then both archives are built
//! from exactly the manifest list. After writing, the on-disk tree and the
//! listings of both archives are checked against the manifest. Existing
//! artifacts of the same name are renamed aside, never overwritten.

pub mod archive;
mod manifest;

pub use manifest::{collect_files, Manifest, MANIFEST_FILE};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::RunConfig;
use crate::error::FatalError;
use crate::fs::{move_aside, RealFileSystem};
use crate::stacks::StackId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub format: ArchiveFormat,
    pub bytes: u64,
    pub sha256: String,
}

impl Artifact {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Summary written next to the archives
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactIndex {
    pub organization: String,
    pub org_key: String,
    pub version: String,
    pub stacks: Vec<StackId>,
    pub manifest_files: usize,
    pub generated_at: DateTime<Utc>,
    pub archives: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub name: String,
    pub format: ArchiveFormat,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct PackageOutput {
    pub manifest: Manifest,
    pub zip: Artifact,
    pub tar_gz: Artifact,
    pub index: PathBuf,
    /// Previous artifacts that were renamed aside
    pub backups: Vec<PathBuf>,
}

impl PackageOutput {
    pub fn artifacts(&self) -> Vec<Artifact> {
        vec![self.zip.clone(), self.tar_gz.clone()]
    }
}

#[derive(Debug, Default)]
pub struct Packager;

impl Packager {
    pub fn new() -> Self {
        Self
    }

    pub fn package(
        &self,
        config: &RunConfig,
        tree_root: &Path,
        stacks: &[StackId],
    ) -> Result<PackageOutput, FatalError> {
        self.try_package(config, tree_root, stacks)
            .map_err(FatalError::Packaging)
    }

    fn try_package(
        &self,
        config: &RunConfig,
        tree_root: &Path,
        stacks: &[StackId],
    ) -> Result<PackageOutput> {
        let manifest = Manifest::write(tree_root)?;
        info!("Manifest written with {} files", manifest.len());

        let prefix = config.framework_name();
        let stem = config.artifact_stem();
        let artifact_dir = config.artifact_dir();
        let mut backups = Vec::new();

        let zip_path = artifact_dir.join(format!("{}.{}", stem, ArchiveFormat::Zip));
        let tar_path = artifact_dir.join(format!("{}.{}", stem, ArchiveFormat::TarGz));
        let index_path = artifact_dir.join(format!("{}.json", stem));
        for path in [&zip_path, &tar_path, &index_path] {
            if let Some(backup) = move_aside(&RealFileSystem, path)? {
                backups.push(backup);
            }
        }

        archive::write_zip(&zip_path, tree_root, &prefix, &manifest.files)?;
        archive::write_tar_gz(&tar_path, tree_root, &prefix, &manifest.files)?;

        verify("framework tree", &collect_files(tree_root)?, &manifest)?;
        verify("zip archive", &archive::list_zip(&zip_path, &prefix)?, &manifest)?;
        verify("tar.gz archive", &archive::list_tar_gz(&tar_path, &prefix)?, &manifest)?;

        let zip = describe(&zip_path, ArchiveFormat::Zip)?;
        let tar_gz = describe(&tar_path, ArchiveFormat::TarGz)?;
        for artifact in [&zip, &tar_gz] {
            info!(
                "Artifact {} ({} bytes, sha256 {})",
                artifact.path.display(),
                artifact.bytes,
                artifact.sha256
            );
        }

        let index = ArtifactIndex {
            organization: config.organization().to_string(),
            org_key: config.org_key().to_string(),
            version: config.version().to_string(),
            stacks: stacks.to_vec(),
            manifest_files: manifest.len(),
            generated_at: Utc::now(),
            archives: [&zip, &tar_gz]
                .iter()
                .map(|a| IndexEntry {
                    name: a.file_name(),
                    format: a.format,
                    bytes: a.bytes,
                    sha256: a.sha256.clone(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&index)?;
        fs::write(&index_path, json)
            .with_context(|| format!("Failed to write {}", index_path.display()))?;

        Ok(PackageOutput {
            manifest,
            zip,
            tar_gz,
            index: index_path,
            backups,
        })
    }
}

fn verify(what: &str, actual: &[String], manifest: &Manifest) -> Result<()> {
    if actual == manifest.files.as_slice() {
        return Ok(());
    }
    let missing: Vec<&String> = manifest.files.iter().filter(|f| !actual.contains(f)).collect();
    let extra: Vec<&String> = actual.iter().filter(|f| !manifest.files.contains(f)).collect();
    bail!(
        "{} disagrees with the manifest (missing: {:?}, unexpected: {:?})",
        what,
        missing,
        extra
    )
}

fn describe(path: &Path, format: ArchiveFormat) -> Result<Artifact> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let bytes = io::copy(&mut file, &mut hasher)?;
    Ok(Artifact {
        path: path.to_path_buf(),
        format,
        bytes,
        sha256: hex::encode(hasher.finalize()),
    })
}
