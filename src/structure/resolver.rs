//! Project structure resolution
//!
//! Runs root detectors in priority order and takes the first structure one
//! of them recognizes. When none does, the starting directory is treated as
//! a standalone package root.

use super::detector::{LernaDetector, RootDetector, TopmostManifestDetector};
use super::ProjectStructure;
use crate::error::ProjectError;
use crate::fs::FileSystem;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ProjectStructureResolver {
    detectors: Vec<Box<dyn RootDetector>>,
}

impl ProjectStructureResolver {
    pub fn new(detectors: Vec<Box<dyn RootDetector>>) -> Self {
        Self { detectors }
    }

    /// Lerna first, then the topmost package.json.
    pub fn with_defaults(file_system: Arc<dyn FileSystem>) -> Self {
        Self::new(vec![
            Box::new(LernaDetector::new(file_system.clone())),
            Box::new(TopmostManifestDetector::new(file_system)),
        ])
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub async fn resolve(&self, initial_directory: &Path) -> Result<ProjectStructure, ProjectError> {
        for detector in &self.detectors {
            if let Some(structure) = detector.detect(initial_directory).await? {
                info!(
                    detector = detector.name(),
                    root = %structure.root_directory.display(),
                    monorepo = structure.is_monorepo,
                    packages = structure.package_directories.len(),
                    "Resolved project structure"
                );
                return Ok(structure);
            }
            debug!(detector = detector.name(), "No match");
        }

        info!(
            directory = %initial_directory.display(),
            "No project structure detected; treating directory as standalone package"
        );
        Ok(ProjectStructure::standalone(initial_directory))
    }
}
