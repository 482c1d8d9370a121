//! FileSystem trait definition

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Abstraction over file system operations for testability.
///
/// Errors keep their `io::ErrorKind` so callers can tell a missing file
/// apart from a permission problem.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    async fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    async fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    async fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write a file, replacing any previous contents. The parent directory must exist.
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Create a directory and all of its missing parents
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// List directory contents
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Canonicalize a path
    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}
