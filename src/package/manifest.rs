//! Deterministic file manifest
//!
//! The manifest lists every regular file of the tree, itself included,
//! relative to the tree root with `/` separators, sorted byte-wise.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MANIFEST_FILE: &str = "MANIFEST.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub path: PathBuf,
    pub files: Vec<String>,
}

impl Manifest {
    /// Captures the tree and writes `MANIFEST.txt` into it
    pub fn write(root: &Path) -> Result<Self> {
        let mut files = collect_files(root)?;
        if !files.iter().any(|f| f == MANIFEST_FILE) {
            files.push(MANIFEST_FILE.to_string());
        }
        files.sort();

        let path = root.join(MANIFEST_FILE);
        fs::write(&path, render(&files))
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;

        Ok(Self { path, files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn render(files: &[String]) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(file);
        out.push('\n');
    }
    out
}

/// Sorted relative paths of every regular file under `root`
pub fn collect_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} escaped {}", entry.path().display(), root.display()))?;
        files.push(to_manifest_path(relative));
    }
    files.sort();
    Ok(files)
}

fn to_manifest_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
