//! Topmost package.json detection

use super::RootDetector;
use crate::error::ProjectError;
use crate::fs::FileSystem;
use crate::model::manifest::{Workspaces, MANIFEST_FILE};
use crate::structure::glob::resolve_package_globs;
use crate::structure::walker::DirectoryWalker;
use crate::structure::{load_json, ProjectStructure};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Treats the topmost ancestor with a package.json as the project root.
///
/// A root declaring npm/yarn `workspaces` is a monorepo. Any other root is
/// a standalone project, even when it lies above the starting directory;
/// the project model rejects that mismatch.
pub struct TopmostManifestDetector {
    file_system: Arc<dyn FileSystem>,
}

impl TopmostManifestDetector {
    pub fn new(file_system: Arc<dyn FileSystem>) -> Self {
        Self { file_system }
    }

    pub async fn find_root(&self, initial_directory: &Path) -> Option<PathBuf> {
        DirectoryWalker::new(self.file_system.clone(), initial_directory)
            .find_all_files(MANIFEST_FILE)
            .await
            .first()
            .and_then(|path| path.parent())
            .map(Path::to_path_buf)
    }

    async fn workspace_patterns(&self, root: &Path) -> Result<Option<Vec<String>>, ProjectError> {
        let path = root.join(MANIFEST_FILE);
        let workspaces = load_json(self.file_system.as_ref(), &path)
            .await?
            .and_then(|mut manifest| manifest.get_mut("workspaces").map(|w| w.take()));

        let Some(workspaces) = workspaces else {
            return Ok(None);
        };

        let workspaces: Workspaces =
            serde_json::from_value(workspaces).map_err(|e| ProjectError::ManifestValidation {
                directory: root.to_path_buf(),
                path: path.clone(),
                reason: format!("invalid `workspaces`: {}", e),
            })?;
        Ok(Some(workspaces.patterns().to_vec()))
    }
}

#[async_trait]
impl RootDetector for TopmostManifestDetector {
    fn name(&self) -> &'static str {
        "TopmostManifest"
    }

    async fn detect(&self, initial_directory: &Path) -> Result<Option<ProjectStructure>, ProjectError> {
        let Some(root) = self.find_root(initial_directory).await else {
            return Ok(None);
        };

        match self.workspace_patterns(&root).await? {
            Some(patterns) => {
                debug!(root = %root.display(), globs = patterns.len(), "Detected workspaces root");
                let packages =
                    resolve_package_globs(self.file_system.as_ref(), &root, &patterns).await?;
                Ok(Some(ProjectStructure::monorepo(root, packages)))
            }
            None => {
                if root != initial_directory {
                    debug!(
                        root = %root.display(),
                        initial = %initial_directory.display(),
                        "Standalone root lies above the starting directory"
                    );
                }
                Ok(Some(ProjectStructure::standalone(root)))
            }
        }
    }
}
