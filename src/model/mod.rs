//! Project model: manifests, packages and the resolved project aggregate

pub mod factory;
pub mod manifest;
pub mod package;
pub mod project;

pub use factory::ProjectFactory;
pub use manifest::{PackageManifest, Workspaces, MANIFEST_FILE};
pub use package::{ManifestPackageLoader, Package, PackageLoader};
pub use project::Project;
