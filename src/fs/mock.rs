use super::{DirEntry, FileSystem, FileType};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

/// In-memory file system. Each test builds its own instance; nothing is shared.
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    unreadable: RwLock<HashSet<PathBuf>>,
    written: RwLock<Vec<PathBuf>>,
    root: PathBuf,
}

impl MockFileSystem {
    /// Relative paths are resolved against `/mock`.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            unreadable: RwLock::new(HashSet::new()),
            written: RwLock::new(Vec::new()),
            root: PathBuf::from("/mock"),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, &path);
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.files
            .write()
            .unwrap()
            .retain(|existing, _| !existing.starts_with(&path));
    }

    /// Makes reads of `path` fail with `PermissionDenied`.
    pub fn deny_read(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.unreadable.write().unwrap().insert(path);
    }

    /// Drops every entry, denial and write record.
    pub fn clear(&self) {
        self.files.write().unwrap().clear();
        self.unreadable.write().unwrap().clear();
        self.written.write().unwrap().clear();
    }

    /// Paths passed to `write`, in call order.
    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.written.read().unwrap().clone()
    }

    /// Contents of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.normalize_path(path.as_ref());
        self.files
            .read()
            .unwrap()
            .get(&path)
            .and_then(|entry| entry.content.clone())
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("No such file or directory: {}", path.display()),
        )
    }

    fn check_readable(&self, path: &Path) -> io::Result<()> {
        if self.unreadable.read().unwrap().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Permission denied: {}", path.display()),
            ));
        }
        Ok(())
    }

    fn entry_type(&self, path: &Path) -> Option<FileType> {
        let path = self.normalize_path(path);
        self.files.read().unwrap().get(&path).map(|e| e.file_type)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystem for MockFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        self.entry_type(path).is_some()
    }

    async fn is_dir(&self, path: &Path) -> bool {
        self.entry_type(path) == Some(FileType::Directory)
    }

    async fn is_file(&self, path: &Path) -> bool {
        self.entry_type(path) == Some(FileType::File)
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let path = self.normalize_path(path);
        self.check_readable(&path)?;

        let files = self.files.read().unwrap();
        let entry = files.get(&path).ok_or_else(|| Self::not_found(&path))?;

        entry.content.clone().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Is a directory: {}", path.display()),
            )
        })
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let path = self.normalize_path(path);
        let content = String::from_utf8(contents.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut files = self.files.write().unwrap();
        let parent_is_dir = path
            .parent()
            .and_then(|parent| files.get(parent))
            .map(|entry| entry.file_type == FileType::Directory)
            .unwrap_or(false);
        if !parent_is_dir {
            return Err(Self::not_found(&path));
        }

        files.insert(
            path.clone(),
            MockEntry {
                content: Some(content),
                file_type: FileType::File,
            },
        );
        self.written.write().unwrap().push(path);
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.add_dir(path);
        Ok(())
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        self.check_readable(&path)?;

        let files = self.files.read().unwrap();
        if !files.contains_key(&path) {
            return Err(Self::not_found(&path));
        }

        let entries = files
            .iter()
            .filter(|(file_path, _)| file_path.parent() == Some(path.as_path()))
            .map(|(file_path, entry)| DirEntry {
                path: file_path.clone(),
                name: file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string(),
                file_type: entry.file_type,
            })
            .collect();

        Ok(entries)
    }

    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let normalized = self.normalize_path(path);
        if self.files.read().unwrap().contains_key(&normalized) {
            Ok(normalized)
        } else {
            Err(Self::not_found(path))
        }
    }
}
