//! Project structure detection
//!
//! Works out whether a directory belongs to a monorepo or is a standalone
//! package, and which directories hold the project's packages. Detection
//! is driven by [`RootDetector`] strategies run in priority order by the
//! [`ProjectStructureResolver`].

pub mod detector;
pub mod glob;
pub mod resolver;
pub mod walker;

pub use detector::{LernaDetector, RootDetector, TopmostManifestDetector};
pub use resolver::ProjectStructureResolver;
pub use walker::DirectoryWalker;

use crate::error::ProjectError;
use crate::fs::FileSystem;
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};

/// Resolved layout of a project, before any manifest has been loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStructure {
    pub is_monorepo: bool,
    pub root_directory: PathBuf,
    /// Member package directories, in discovery order. Not de-duplicated.
    pub package_directories: Vec<PathBuf>,
}

impl ProjectStructure {
    /// A single package rooted at `directory`.
    pub fn standalone(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        Self {
            is_monorepo: false,
            root_directory: directory.clone(),
            package_directories: vec![directory],
        }
    }

    pub fn monorepo(root_directory: impl Into<PathBuf>, package_directories: Vec<PathBuf>) -> Self {
        Self {
            is_monorepo: true,
            root_directory: root_directory.into(),
            package_directories,
        }
    }
}

/// Reads and parses a JSON file. A missing file is `Ok(None)`.
pub async fn load_json(file_system: &dyn FileSystem, path: &Path) -> Result<Option<Value>, ProjectError> {
    match file_system.read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ProjectError::parse(path, source)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ProjectError::io(path, e)),
    }
}
