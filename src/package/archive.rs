//! Archive writers and readers
//!
//! Both formats are built from the same manifest list, with every entry
//! rooted at the framework directory name.

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes `files` (relative to `root`) into a gzip-compressed tar at `dest`
pub fn write_tar_gz(dest: &Path, root: &Path, prefix: &str, files: &[String]) -> Result<()> {
    let file = File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);

    for relative in files {
        let source = root.join(relative);
        builder
            .append_path_with_name(&source, format!("{}/{}", prefix, relative))
            .with_context(|| format!("Failed to add {} to tar", source.display()))?;
    }

    let encoder = builder.into_inner().context("Failed to finish tar stream")?;
    let mut writer = encoder.finish().context("Failed to finish gzip stream")?;
    writer.flush()?;
    Ok(())
}

pub fn write_zip(dest: &Path, root: &Path, prefix: &str, files: &[String]) -> Result<()> {
    let file = File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let mut zip = zip::ZipWriter::new(BufWriter::new(file));

    for relative in files {
        let source = root.join(relative);
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(unix_mode(&source)?);
        zip.start_file(format!("{}/{}", prefix, relative), options)
            .with_context(|| format!("Failed to add {} to zip", source.display()))?;
        let mut input = File::open(&source)
            .with_context(|| format!("Failed to open {}", source.display()))?;
        io::copy(&mut input, &mut zip)?;
    }

    let mut writer = zip.finish().context("Failed to finish zip archive")?;
    writer.flush()?;
    Ok(())
}

#[cfg(unix)]
fn unix_mode(path: &Path) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(path)?.permissions().mode();
    Ok(if mode & 0o111 != 0 { 0o755 } else { 0o644 })
}

#[cfg(not(unix))]
fn unix_mode(_path: &Path) -> Result<u32> {
    Ok(0o644)
}

/// Regular files in a `.tar.gz`, with `prefix/` stripped, sorted
pub fn list_tar_gz(path: &Path, prefix: &str) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));

    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path()?.to_string_lossy().to_string();
        names.push(strip_prefix(&name, prefix)?);
    }
    names.sort();
    Ok(names)
}

pub fn list_zip(path: &Path, prefix: &str) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    let mut names = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        names.push(strip_prefix(entry.name(), prefix)?);
    }
    names.sort();
    Ok(names)
}

fn strip_prefix(name: &str, prefix: &str) -> Result<String> {
    match name.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) => Ok(rest.to_string()),
        None => bail!("Archive entry {} is outside {}/", name, prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Vec<String>) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tree");
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("build.sh"), "#!/bin/sh\n").unwrap();
        fs::write(root.join("docs/PITCH.md"), "# Pitch\n").unwrap();
        (dir, vec!["build.sh".to_string(), "docs/PITCH.md".to_string()])
    }

    #[test]
    fn test_tar_gz_entries_are_prefixed() {
        let (dir, files) = fixture();
        let dest = dir.path().join("out.tar.gz");
        write_tar_gz(&dest, &dir.path().join("tree"), "ACME_enterprise_framework", &files).unwrap();

        assert_eq!(list_tar_gz(&dest, "ACME_enterprise_framework").unwrap(), files);
        assert!(list_tar_gz(&dest, "OTHER").is_err());
    }

    #[test]
    fn test_zip_entries_are_prefixed() {
        let (dir, files) = fixture();
        let dest = dir.path().join("out.zip");
        write_zip(&dest, &dir.path().join("tree"), "ACME_enterprise_framework", &files).unwrap();

        assert_eq!(list_zip(&dest, "ACME_enterprise_framework").unwrap(), files);
    }

    #[test]
    fn test_missing_source_file_fails() {
        let (dir, mut files) = fixture();
        files.push("does/not/exist".to_string());

        let tree = dir.path().join("tree");
        assert!(write_zip(&dir.path().join("out.zip"), &tree, "P", &files).is_err());
        assert!(write_tar_gz(&dir.path().join("out.tar.gz"), &tree, "P", &files).is_err());
    }
}
