//! The resolved project aggregate
//!
//! [`Project`] is what every build step works on: the root, the monorepo
//! flag, the member packages and the filesystem they were read through.

use super::package::Package;
use crate::error::ProjectError;
use crate::fs::FileSystem;
use crate::structure::load_json;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A resolved project: its root, whether it is a monorepo, and every
/// member package. Read-only once constructed.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    initial_directory: PathBuf,
    is_monorepo: bool,
    #[serde(rename = "projectRootDir")]
    root_directory: PathBuf,
    packages: Vec<Package>,
    #[serde(skip)]
    file_system: Arc<dyn FileSystem>,
}

impl Project {
    /// Builds a project, keeping the first package seen for each directory.
    ///
    /// A standalone project must be invoked from its own root; any other
    /// initial directory is a [`ProjectError::ConstraintViolation`].
    pub fn new(
        file_system: Arc<dyn FileSystem>,
        initial_directory: impl Into<PathBuf>,
        is_monorepo: bool,
        root_directory: impl Into<PathBuf>,
        packages: Vec<Package>,
    ) -> Result<Self, ProjectError> {
        let initial_directory = initial_directory.into();
        let root_directory = root_directory.into();

        if !is_monorepo && initial_directory != root_directory {
            return Err(ProjectError::ConstraintViolation {
                field: "initialDirectory".to_string(),
                value: initial_directory.display().to_string(),
                message: format!(
                    "A standalone project must be built from its root directory {} (invoked in {})",
                    root_directory.display(),
                    initial_directory.display()
                ),
            });
        }

        let total = packages.len();
        let mut seen = HashSet::new();
        let packages: Vec<Package> = packages
            .into_iter()
            .filter(|package| seen.insert(package.directory.clone()))
            .collect();
        if packages.len() != total {
            debug!(
                duplicates = total - packages.len(),
                "Dropped packages resolved more than once"
            );
        }

        Ok(Self {
            initial_directory,
            is_monorepo,
            root_directory,
            packages,
            file_system,
        })
    }

    pub fn initial_directory(&self) -> &Path {
        &self.initial_directory
    }

    pub fn is_monorepo(&self) -> bool {
        self.is_monorepo
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.file_system
    }

    /// Packages in scope for this invocation: every package when a monorepo
    /// is built from its root, otherwise the package at the initial
    /// directory, if there is one.
    pub fn packages_to_build(&self) -> Vec<&Package> {
        if self.is_monorepo && self.initial_directory == self.root_directory {
            return self.packages.iter().collect();
        }
        self.package_from_dir(&self.initial_directory).into_iter().collect()
    }

    pub fn package_from_dir(&self, directory: &Path) -> Option<&Package> {
        self.packages.iter().find(|p| p.directory == directory)
    }

    pub fn package_by_name(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name() == name)
    }

    pub fn is_project_root(&self, directory: &Path) -> bool {
        self.root_directory == directory
    }

    /// Reads a file relative to the project root. Missing files are `None`.
    pub async fn read_file(&self, relative: impl AsRef<Path>) -> Result<Option<String>, ProjectError> {
        let path = self.root_directory.join(relative);
        match self.file_system.read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProjectError::io(path, e)),
        }
    }

    pub async fn read_json_file(&self, relative: impl AsRef<Path>) -> Result<Option<Value>, ProjectError> {
        let path = self.root_directory.join(relative);
        load_json(self.file_system.as_ref(), &path).await
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("initial_directory", &self.initial_directory)
            .field("is_monorepo", &self.is_monorepo)
            .field("root_directory", &self.root_directory)
            .field("packages", &self.packages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectErrorKind;
    use crate::fs::MockFileSystem;
    use crate::model::manifest::PackageManifest;
    use std::collections::BTreeMap;

    fn package(directory: &str, name: &str) -> Package {
        Package::new(
            directory,
            PackageManifest {
                name: name.to_string(),
                version: None,
                dependencies: BTreeMap::new(),
                workspaces: None,
            },
        )
    }

    fn monorepo(initial_directory: &str) -> Project {
        Project::new(
            Arc::new(MockFileSystem::new()),
            initial_directory,
            true,
            "/R",
            vec![package("/R/a", "a"), package("/R/b", "b")],
        )
        .unwrap()
    }

    fn names(packages: Vec<&Package>) -> Vec<&str> {
        packages.into_iter().map(Package::name).collect()
    }

    #[test]
    fn test_packages_to_build_from_root() {
        assert_eq!(names(monorepo("/R").packages_to_build()), vec!["a", "b"]);
    }

    #[test]
    fn test_packages_to_build_from_package() {
        assert_eq!(names(monorepo("/R/a").packages_to_build()), vec!["a"]);
    }

    #[test]
    fn test_packages_to_build_from_unrelated_directory() {
        assert!(monorepo("/R/tools").packages_to_build().is_empty());
    }

    #[test]
    fn test_standalone_requires_matching_directories() {
        for (initial, root) in [("/app/src", "/app"), ("/", "/app"), ("/other", "/app")] {
            let err = Project::new(
                Arc::new(MockFileSystem::new()),
                initial,
                false,
                root,
                vec![package(root, "app")],
            )
            .unwrap_err();
            assert_eq!(err.kind(), ProjectErrorKind::ConstraintViolation);
            match err {
                ProjectError::ConstraintViolation { field, value, .. } => {
                    assert_eq!(field, "initialDirectory");
                    assert_eq!(value, initial);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_standalone_builds_its_package() {
        let project = Project::new(
            Arc::new(MockFileSystem::new()),
            "/app",
            false,
            "/app",
            vec![package("/app", "app")],
        )
        .unwrap();
        assert_eq!(names(project.packages_to_build()), vec!["app"]);
        assert!(project.is_project_root(Path::new("/app")));
    }

    #[test]
    fn test_duplicate_directories_collapse() {
        let project = Project::new(
            Arc::new(MockFileSystem::new()),
            "/R",
            true,
            "/R",
            vec![package("/R/a", "a"), package("/R/b", "b"), package("/R/a", "a")],
        )
        .unwrap();
        assert_eq!(project.packages().len(), 2);
    }

    #[test]
    fn test_lookups() {
        let project = monorepo("/R");
        assert_eq!(
            project.package_from_dir(Path::new("/R/b")).map(Package::name),
            Some("b")
        );
        assert_eq!(
            project.package_by_name("a").map(|p| p.directory.clone()),
            Some(PathBuf::from("/R/a"))
        );
        assert!(project.package_by_name("c").is_none());
        assert!(!project.is_project_root(Path::new("/R/a")));
    }

    #[tokio::test]
    async fn test_read_files_relative_to_root() {
        let fs = MockFileSystem::new();
        fs.add_file("/R/tsconfig.json", r#"{"compilerOptions": {"strict": true}}"#);
        fs.add_file("/R/broken.json", "{");
        let project = Project::new(Arc::new(fs), "/R", true, "/R", vec![]).unwrap();

        let text = project.read_file("tsconfig.json").await.unwrap().unwrap();
        assert!(text.contains("strict"));

        let json = project.read_json_file("tsconfig.json").await.unwrap().unwrap();
        assert_eq!(json["compilerOptions"]["strict"], Value::Bool(true));

        assert!(project.read_file("missing.json").await.unwrap().is_none());
        assert!(project.read_json_file("missing.json").await.unwrap().is_none());

        let err = project.read_json_file("broken.json").await.unwrap_err();
        assert_eq!(err.kind(), ProjectErrorKind::ManifestParse);
    }

    #[test]
    fn test_serializes_for_dump() {
        let json = serde_json::to_value(monorepo("/R")).unwrap();
        assert_eq!(json["isMonorepo"], Value::Bool(true));
        assert_eq!(json["projectRootDir"], Value::String("/R".to_string()));
        assert_eq!(json["packages"].as_array().map(Vec::len), Some(2));
    }
}
