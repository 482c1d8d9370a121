//! Project creation: structure resolution followed by concurrent package loading

use super::package::{ManifestPackageLoader, PackageLoader};
use super::project::Project;
use crate::error::ProjectError;
use crate::fs::FileSystem;
use crate::structure::ProjectStructureResolver;
use futures_util::future::try_join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves a starting directory into a fully loaded [`Project`].
pub struct ProjectFactory {
    file_system: Arc<dyn FileSystem>,
    resolver: ProjectStructureResolver,
    loader: Box<dyn PackageLoader>,
}

impl ProjectFactory {
    pub fn new(
        file_system: Arc<dyn FileSystem>,
        resolver: ProjectStructureResolver,
        loader: Box<dyn PackageLoader>,
    ) -> Self {
        Self {
            file_system,
            resolver,
            loader,
        }
    }

    /// Default detector chain and manifest loader over `file_system`.
    pub fn with_defaults(file_system: Arc<dyn FileSystem>) -> Self {
        Self::new(
            file_system.clone(),
            ProjectStructureResolver::with_defaults(file_system.clone()),
            Box::new(ManifestPackageLoader::new(file_system)),
        )
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.file_system
    }

    /// Every package is loaded concurrently; the first failure aborts the
    /// whole resolution and no partial project is returned.
    pub async fn create_project(&self, initial_directory: &Path) -> Result<Project, ProjectError> {
        let structure = self.resolver.resolve(initial_directory).await?;
        debug!(
            packages = structure.package_directories.len(),
            "Loading package manifests"
        );

        let packages = try_join_all(
            structure
                .package_directories
                .iter()
                .map(|directory| self.loader.load_package(directory)),
        )
        .await?;

        let project = Project::new(
            self.file_system.clone(),
            initial_directory,
            structure.is_monorepo,
            structure.root_directory,
            packages,
        )?;

        info!(
            root = %project.root_directory().display(),
            monorepo = project.is_monorepo(),
            packages = project.packages().len(),
            to_build = project.packages_to_build().len(),
            "Project resolved"
        );
        Ok(project)
    }
}
