use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{attribution, GeneratedFile, GenerationContext};
use crate::error::FatalError;
use crate::fs::{move_aside, FileSystem};

/// The generated directory for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkTree {
    pub root: PathBuf,
    /// Where a pre-existing tree at `root` was renamed to
    pub backup: Option<PathBuf>,
    /// Written files, relative to `root`, in write order
    pub files: Vec<PathBuf>,
}

impl FrameworkTree {
    /// Renames any existing directory at `root` aside, then creates it fresh
    pub fn prepare(fs: &dyn FileSystem, root: &Path) -> Result<Self, FatalError> {
        let backup = move_aside(fs, root).map_err(|source| FatalError::DirectoryCreation {
            path: root.to_path_buf(),
            source,
        })?;
        if let Some(backup) = &backup {
            info!("Existing framework tree backed up to {}", backup.display());
        }

        fs.create_dir_all(root)
            .map_err(|source| FatalError::DirectoryCreation {
                path: root.to_path_buf(),
                source,
            })?;
        info!("Created framework directory {}", root.display());

        Ok(Self {
            root: root.to_path_buf(),
            backup,
            files: Vec::new(),
        })
    }
}

/// Writes generated files into a tree, wrapping each in the attribution block
pub struct TreeWriter<'a> {
    fs: &'a dyn FileSystem,
    ctx: &'a GenerationContext,
}

impl<'a> TreeWriter<'a> {
    pub fn new(fs: &'a dyn FileSystem, ctx: &'a GenerationContext) -> Self {
        Self { fs, ctx }
    }

    pub fn write(&self, tree: &mut FrameworkTree, file: &GeneratedFile) -> Result<(), FatalError> {
        let path = tree.root.join(&file.path);
        let generation_error = |source| FatalError::Generation {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            self.fs.create_dir_all(parent).map_err(generation_error)?;
        }
        let contents = attribution::wrap(&file.path, &file.contents, self.ctx);
        self.fs
            .write(&path, contents.as_bytes())
            .map_err(generation_error)?;
        if file.executable {
            self.fs.set_executable(&path).map_err(generation_error)?;
        }

        debug!("Wrote {}", path.display());
        tree.files.push(file.path.clone());
        Ok(())
    }

    pub fn write_all(
        &self,
        tree: &mut FrameworkTree,
        files: &[GeneratedFile],
    ) -> Result<(), FatalError> {
        for file in files {
            self.write(tree, file)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn ctx() -> GenerationContext {
        GenerationContext::new("/mock/GOOGLE_enterprise_framework", "Google", "v1.0.0")
    }

    #[test]
    fn test_prepare_creates_fresh_directory() {
        let fs = MockFileSystem::new();
        let tree = FrameworkTree::prepare(&fs, Path::new("/mock/GOOGLE_enterprise_framework")).unwrap();

        assert!(fs.is_dir(Path::new("/mock/GOOGLE_enterprise_framework")));
        assert!(tree.backup.is_none());
    }

    #[test]
    fn test_prepare_backs_up_existing_tree() {
        let fs = MockFileSystem::new();
        fs.add_file("/mock/GOOGLE_enterprise_framework/Makefile", "old");

        let tree = FrameworkTree::prepare(&fs, Path::new("/mock/GOOGLE_enterprise_framework")).unwrap();

        let backup = tree.backup.unwrap();
        assert!(backup
            .to_string_lossy()
            .starts_with("/mock/GOOGLE_enterprise_framework.backup-"));
        assert_eq!(fs.contents(backup.join("Makefile")).unwrap(), "old");
        assert!(fs.files_under("/mock/GOOGLE_enterprise_framework/").is_empty());
    }

    #[test]
    fn test_directory_creation_failure_is_fatal() {
        let fs = MockFileSystem::new();
        fs.fail_dirs_under("/mock");

        let err = FrameworkTree::prepare(&fs, Path::new("/mock/GOOGLE_enterprise_framework")).unwrap_err();
        assert!(matches!(err, FatalError::DirectoryCreation { .. }));
    }

    #[test]
    fn test_writer_wraps_and_marks_executable() {
        let fs = MockFileSystem::new();
        let ctx = ctx();
        let mut tree = FrameworkTree::prepare(&fs, &ctx.framework_dir).unwrap();

        TreeWriter::new(&fs, &ctx)
            .write(&mut tree, &GeneratedFile::executable("build.sh", "#!/bin/sh\necho hi\n"))
            .unwrap();

        let path = ctx.framework_dir.join("build.sh");
        let contents = fs.contents(&path).unwrap();
        assert!(contents.starts_with("#!/bin/sh\n# Google Enterprise Framework"));
        assert!(fs.is_executable(&path));
        assert_eq!(tree.files, vec![PathBuf::from("build.sh")]);
    }

    #[test]
    fn test_write_failure_is_fatal() {
        let fs = MockFileSystem::new();
        let ctx = ctx();
        let mut tree = FrameworkTree::prepare(&fs, &ctx.framework_dir).unwrap();
        fs.fail_writes_under(ctx.framework_dir.join("docs"));

        let err = TreeWriter::new(&fs, &ctx)
            .write(&mut tree, &GeneratedFile::new("docs/PITCH.md", "# Pitch"))
            .unwrap_err();

        match err {
            FatalError::Generation { path, .. } => {
                assert_eq!(path, ctx.framework_dir.join("docs/PITCH.md"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
