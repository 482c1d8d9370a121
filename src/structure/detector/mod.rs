//! Root detection strategies

use super::ProjectStructure;
use crate::error::ProjectError;
use async_trait::async_trait;
use std::path::Path;

/// Decides whether a starting directory sits inside a project layout this
/// strategy recognizes. `Ok(None)` means "not mine", never a failure.
#[async_trait]
pub trait RootDetector: Send + Sync {
    /// Human-readable name
    fn name(&self) -> &'static str;

    async fn detect(&self, initial_directory: &Path) -> Result<Option<ProjectStructure>, ProjectError>;
}

pub mod lerna;
pub mod topmost;

pub use lerna::LernaDetector;
pub use topmost::TopmostManifestDetector;
