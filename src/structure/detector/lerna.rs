//! Lerna monorepo detection

use super::RootDetector;
use crate::error::ProjectError;
use crate::fs::FileSystem;
use crate::model::manifest::MANIFEST_FILE;
use crate::structure::glob::resolve_package_globs;
use crate::structure::walker::{parent_directories, DirectoryWalker};
use crate::structure::{load_json, ProjectStructure};
use async_trait::async_trait;
use futures_util::future::join;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub const LERNA_CONFIG_FILE: &str = "lerna.json";

#[derive(Debug, Default, Deserialize)]
struct LernaConfig {
    #[serde(default)]
    packages: Vec<String>,
}

/// Finds the topmost ancestor holding both `lerna.json` and `package.json`
/// and reads member globs from its `packages` list.
pub struct LernaDetector {
    file_system: Arc<dyn FileSystem>,
}

impl LernaDetector {
    pub fn new(file_system: Arc<dyn FileSystem>) -> Self {
        Self { file_system }
    }

    /// Topmost directory holding both files, if any.
    pub async fn find_root(&self, initial_directory: &Path) -> Option<PathBuf> {
        let walker = DirectoryWalker::new(self.file_system.clone(), initial_directory);
        let (lerna_files, manifest_files) = join(
            walker.find_all_files(LERNA_CONFIG_FILE),
            walker.find_all_files(MANIFEST_FILE),
        )
        .await;

        let manifest_dirs = parent_directories(&manifest_files);
        parent_directories(&lerna_files)
            .into_iter()
            .find(|dir| manifest_dirs.contains(dir))
    }

    async fn load_config(&self, root: &Path) -> Result<LernaConfig, ProjectError> {
        let path = root.join(LERNA_CONFIG_FILE);
        let Some(value) = load_json(self.file_system.as_ref(), &path).await? else {
            return Ok(LernaConfig::default());
        };

        serde_json::from_value(value).map_err(|e| ProjectError::ManifestValidation {
            directory: root.to_path_buf(),
            path: path.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl RootDetector for LernaDetector {
    fn name(&self) -> &'static str {
        "Lerna"
    }

    async fn detect(&self, initial_directory: &Path) -> Result<Option<ProjectStructure>, ProjectError> {
        let Some(root) = self.find_root(initial_directory).await else {
            return Ok(None);
        };

        let config = self.load_config(&root).await?;
        debug!(
            root = %root.display(),
            globs = config.packages.len(),
            "Detected lerna monorepo"
        );

        let packages = resolve_package_globs(self.file_system.as_ref(), &root, &config.packages).await?;
        Ok(Some(ProjectStructure::monorepo(root, packages)))
    }
}
