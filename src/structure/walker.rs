//! Ascending directory walker
//!
//! Locates every occurrence of a named file along the chain of ancestors of
//! a starting directory. Results from [`DirectoryWalker::find_all_files`] are
//! ordered root-first: index 0 is the match closest to the filesystem root
//! and the last entry is the match closest to the starting directory.

use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

pub struct DirectoryWalker {
    file_system: Arc<dyn FileSystem>,
    start: PathBuf,
    stop: Option<PathBuf>,
}

impl DirectoryWalker {
    pub fn new(file_system: Arc<dyn FileSystem>, start: impl Into<PathBuf>) -> Self {
        Self {
            file_system,
            start: start.into(),
            stop: None,
        }
    }

    /// Stops the ascent at `stop` (inclusive) instead of the filesystem root.
    pub fn with_stop_directory(mut self, stop: impl Into<PathBuf>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    /// Lazily yields the starting directory and each of its ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Path> + '_ {
        let stop = self.stop.as_deref();
        let mut done = false;
        self.start.ancestors().take_while(move |dir| {
            if done {
                return false;
            }
            if Some(*dir) == stop {
                done = true;
            }
            true
        })
    }

    /// Every `<ancestor>/<filename>` that exists, root-first.
    pub async fn find_all_files(&self, filename: &str) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for dir in self.ancestors() {
            let candidate = dir.join(filename);
            if self.file_system.is_file(&candidate).await {
                trace!(path = %candidate.display(), "found file");
                found.push(candidate);
            }
        }
        found.reverse();
        found
    }

    /// The match nearest to the starting directory.
    pub async fn find_first_file(&self, filename: &str) -> Option<PathBuf> {
        for dir in self.ancestors() {
            let candidate = dir.join(filename);
            if self.file_system.is_file(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }
}

/// Parent directories of the given file paths, order preserved.
pub fn parent_directories(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter_map(|path| path.parent().map(Path::to_path_buf))
        .collect()
}
