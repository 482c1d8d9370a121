//! thrasher - monorepo-aware build orchestration
//!
//! Given the directory a build was started in, thrasher works out whether it
//! belongs to a monorepo or a standalone package, loads every member
//! package, and runs named pipelines of build steps over the packages in
//! scope.
//!
//! # Core Concepts
//!
//! - **Project structure**: [`structure`] walks up from the starting
//!   directory and runs root detectors (lerna, npm/yarn workspaces) to find
//!   the project root and its package directories
//! - **Project**: [`model::Project`] is the resolved, read-only aggregate of
//!   packages, created by [`model::ProjectFactory`]
//! - **Pipelines**: [`pipeline::TaskPipeline`] folds a context through
//!   tasks in order; [`pipeline::BuildTask`] adapts build steps that work
//!   on a project into tasks
//!
//! # Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use thrasher::fs::{FileSystem, RealFileSystem};
//! use thrasher::model::ProjectFactory;
//!
//! let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
//! let project = ProjectFactory::with_defaults(fs)
//!     .create_project(std::path::Path::new("/work/repo"))
//!     .await?;
//!
//! for package in project.packages_to_build() {
//!     println!("{} ({})", package.name(), package.directory.display());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod steps;
pub mod structure;
pub mod util;

pub use config::{ConfigError, ThrasherConfig};
pub use error::{PipelineError, ProjectError, ProjectErrorKind};
pub use model::{Package, PackageManifest, Project, ProjectFactory};
pub use pipeline::{BuildStep, BuildTask, Task, TaskPipeline};
pub use structure::{ProjectStructure, ProjectStructureResolver};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
