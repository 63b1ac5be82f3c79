use super::{FileSystem, FileType};
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<Vec<u8>>,
    pub file_type: FileType,
    pub executable: bool,
}

/// In-memory file system with injectable write failures
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    fail_writes_under: RwLock<Vec<PathBuf>>,
    fail_dirs_under: RwLock<Vec<PathBuf>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            fail_writes_under: RwLock::new(Vec::new()),
            fail_dirs_under: RwLock::new(Vec::new()),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.as_bytes().to_vec()),
                file_type: FileType::File,
                executable: false,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, path.as_ref());
    }

    /// Every write to a path under `prefix` fails
    pub fn fail_writes_under(&self, prefix: impl Into<PathBuf>) {
        self.fail_writes_under.write().unwrap().push(prefix.into());
    }

    /// Every directory creation under `prefix` fails
    pub fn fail_dirs_under(&self, prefix: impl Into<PathBuf>) {
        self.fail_dirs_under.write().unwrap().push(prefix.into());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let files = self.files.read().unwrap();
        files
            .get(path.as_ref())
            .and_then(|entry| entry.content.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).to_string())
    }

    pub fn is_executable(&self, path: impl AsRef<Path>) -> bool {
        let files = self.files.read().unwrap();
        files
            .get(path.as_ref())
            .map(|entry| entry.executable)
            .unwrap_or(false)
    }

    /// Regular files under `prefix`, sorted
    pub fn files_under(&self, prefix: impl AsRef<Path>) -> Vec<PathBuf> {
        let files = self.files.read().unwrap();
        let mut paths: Vec<PathBuf> = files
            .iter()
            .filter(|(path, entry)| {
                entry.file_type == FileType::File && path.starts_with(prefix.as_ref())
            })
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
                executable: false,
            });
        }
    }

    fn blocked(list: &RwLock<Vec<PathBuf>>, path: &Path) -> bool {
        list.read()
            .unwrap()
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|entry| entry.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if Self::blocked(&self.fail_dirs_under, path) {
            bail!("Mock directory creation failure: {:?}", path);
        }
        let mut files = self.files.write().unwrap();
        if let Some(entry) = files.get(path) {
            if entry.file_type == FileType::File {
                bail!("Cannot create directory {:?}: a file exists there", path);
            }
        }
        Self::ensure_parents(&mut files, path);
        Ok(())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if Self::blocked(&self.fail_writes_under, path) {
            bail!("Mock write failure: {:?}", path);
        }
        let mut files = self.files.write().unwrap();
        let parent_is_dir = path
            .parent()
            .and_then(|parent| files.get(parent))
            .map(|entry| entry.file_type == FileType::Directory)
            .unwrap_or(false);
        if !parent_is_dir {
            bail!("Parent directory of {:?} does not exist", path);
        }
        files.insert(
            path.to_path_buf(),
            MockEntry {
                content: Some(contents.to_vec()),
                file_type: FileType::File,
                executable: false,
            },
        );
        Ok(())
    }

    fn set_executable(&self, path: &Path) -> Result<()> {
        let mut files = self.files.write().unwrap();
        let entry = files
            .get_mut(path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
        entry.executable = true;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut files = self.files.write().unwrap();
        if !files.contains_key(from) {
            bail!("Path not found: {:?}", from);
        }
        if files.contains_key(to) {
            bail!("Refusing to rename {:?}: {:?} already exists", from, to);
        }

        let moved: Vec<PathBuf> = files
            .keys()
            .filter(|path| path.starts_with(from))
            .cloned()
            .collect();
        for old in moved {
            if let Some(entry) = files.remove(&old) {
                let suffix = old.strip_prefix(from).unwrap_or(Path::new(""));
                let new = if suffix.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(suffix)
                };
                files.insert(new, entry);
            }
        }
        Ok(())
    }
}
