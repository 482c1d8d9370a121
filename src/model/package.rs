//! Loaded packages and the loader that reads them from disk
//!
//! A [`Package`] pairs a directory with its validated manifest. Files inside
//! a package are read through the caller's [`FileSystem`], relative to the
//! package directory.

use super::manifest::{PackageManifest, MANIFEST_FILE};
use crate::error::ProjectError;
use crate::fs::FileSystem;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One discovered package. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub directory: PathBuf,
    pub manifest: PackageManifest,
}

impl Package {
    pub fn new(directory: impl Into<PathBuf>, manifest: PackageManifest) -> Self {
        Self {
            directory: directory.into(),
            manifest,
        }
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.manifest.dependency_names()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.directory.join(MANIFEST_FILE)
    }

    /// Reads a file relative to the package directory. Missing files are
    /// `None`.
    pub async fn read_file(
        &self,
        file_system: &dyn FileSystem,
        relative: impl AsRef<Path>,
    ) -> Result<Option<String>, ProjectError> {
        read_optional(file_system, &self.directory.join(relative)).await
    }

    /// Like [`Package::read_file`], parsed as JSON. Invalid JSON is a
    /// [`ProjectError::PackageFileParse`] naming this package.
    pub async fn read_json_file(
        &self,
        file_system: &dyn FileSystem,
        relative: impl AsRef<Path>,
    ) -> Result<Option<Value>, ProjectError> {
        let path = self.directory.join(relative);
        let Some(content) = read_optional(file_system, &path).await? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ProjectError::PackageFileParse {
                package: self.name().to_string(),
                path,
                source,
            })
    }
}

async fn read_optional(file_system: &dyn FileSystem, path: &Path) -> Result<Option<String>, ProjectError> {
    match file_system.read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ProjectError::io(path, e)),
    }
}

#[async_trait]
pub trait PackageLoader: Send + Sync {
    async fn load_package(&self, directory: &Path) -> Result<Package, ProjectError>;
}

/// Loads packages from the `package.json` in their directory.
pub struct ManifestPackageLoader {
    file_system: Arc<dyn FileSystem>,
}

impl ManifestPackageLoader {
    pub fn new(file_system: Arc<dyn FileSystem>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl PackageLoader for ManifestPackageLoader {
    async fn load_package(&self, directory: &Path) -> Result<Package, ProjectError> {
        let path = directory.join(MANIFEST_FILE);
        let content = match self.file_system.read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ProjectError::ManifestNotFound {
                    directory: directory.to_path_buf(),
                    path,
                })
            }
            Err(e) => return Err(ProjectError::io(path, e)),
        };

        let manifest = PackageManifest::parse(&content, directory, &path)?;
        Ok(Package::new(directory, manifest))
    }
}
