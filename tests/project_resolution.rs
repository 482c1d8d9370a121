//! Project resolution against the real filesystem
//!
//! These tests drive the public library API end to end: structure
//! detection, package loading and the project queries built on them.

mod support;

use std::sync::Arc;
use support::{lerna_monorepo, standalone_package, workspaces_monorepo, TestRepo};
use thrasher::fs::{FileSystem, RealFileSystem};
use thrasher::structure::DirectoryWalker;
use thrasher::{Project, ProjectErrorKind, ProjectFactory, ProjectStructureResolver};

fn real_fs() -> Arc<dyn FileSystem> {
    Arc::new(RealFileSystem::new())
}

async fn create(repo: &TestRepo, relative: &str) -> Result<Project, thrasher::ProjectError> {
    let directory = if relative.is_empty() {
        repo.root().to_path_buf()
    } else {
        repo.path(relative)
    };
    ProjectFactory::with_defaults(real_fs())
        .create_project(&directory)
        .await
}

fn names(project: &Project) -> Vec<&str> {
    project.packages().iter().map(|p| p.name()).collect()
}

fn names_to_build(project: &Project) -> Vec<&str> {
    project
        .packages_to_build()
        .into_iter()
        .map(|p| p.name())
        .collect()
}

#[tokio::test]
async fn test_lerna_monorepo_from_root() {
    let repo = lerna_monorepo();
    let project = create(&repo, "").await.unwrap();

    assert!(project.is_monorepo());
    assert_eq!(project.root_directory(), repo.root());
    assert_eq!(names(&project), vec!["package-one", "@scope/package-two"]);
    assert_eq!(
        names_to_build(&project),
        vec!["package-one", "@scope/package-two"]
    );
}

#[tokio::test]
async fn test_lerna_monorepo_from_package_directory() {
    let repo = lerna_monorepo();
    let project = create(&repo, "packages/package-one-dir").await.unwrap();

    assert_eq!(project.root_directory(), repo.root());
    assert_eq!(project.packages().len(), 2);
    assert_eq!(names_to_build(&project), vec!["package-one"]);
}

#[tokio::test]
async fn test_lerna_monorepo_from_unrelated_subdirectory() {
    let repo = lerna_monorepo();
    repo.mkdir("scripts/release");

    let project = create(&repo, "scripts/release").await.unwrap();
    assert_eq!(project.root_directory(), repo.root());
    assert!(project.packages_to_build().is_empty());
}

#[tokio::test]
async fn test_workspaces_monorepo() {
    let repo = workspaces_monorepo();
    let project = create(&repo, "packages/b").await.unwrap();

    assert!(project.is_monorepo());
    assert_eq!(project.root_directory(), repo.root());
    assert_eq!(names(&project), vec!["a", "b"]);
    assert_eq!(names_to_build(&project), vec!["b"]);

    let b = project.package_by_name("b").unwrap();
    let siblings: Vec<&str> = b
        .dependency_names()
        .filter(|name| project.package_by_name(name).is_some())
        .collect();
    assert_eq!(siblings, vec!["a"]);
}

#[tokio::test]
async fn test_glob_skips_plain_files() {
    let repo = workspaces_monorepo();
    repo.write("packages/README.md", "# packages\n");

    let project = create(&repo, "").await.unwrap();
    assert_eq!(names(&project), vec!["a", "b"]);
}

#[tokio::test]
async fn test_standalone_package() {
    let repo = standalone_package();
    let project = create(&repo, "").await.unwrap();

    assert!(!project.is_monorepo());
    assert_eq!(names(&project), vec!["my-package"]);
    assert_eq!(names_to_build(&project), vec!["my-package"]);
}

#[tokio::test]
async fn test_standalone_package_from_subdirectory_is_rejected() {
    let repo = standalone_package();
    let err = create(&repo, "src").await.unwrap_err();

    assert_eq!(err.kind(), ProjectErrorKind::ConstraintViolation);
    assert!(err.to_string().contains("standalone project"));
}

#[tokio::test]
async fn test_directory_without_manifest() {
    let repo = TestRepo::new(&[]);
    repo.mkdir("empty");

    let err = create(&repo, "empty").await.unwrap_err();
    assert_eq!(err.kind(), ProjectErrorKind::ManifestNotFound);
}

#[tokio::test]
async fn test_invalid_member_manifest_aborts() {
    let repo = workspaces_monorepo();
    repo.write("packages/c/package.json", "{ \"name\": ");

    let err = create(&repo, "").await.unwrap_err();
    assert_eq!(err.kind(), ProjectErrorKind::ManifestParse);
    assert!(err
        .to_string()
        .contains(&repo.path("packages/c/package.json").display().to_string()));
}

#[tokio::test]
async fn test_resolver_reports_structure_only() {
    let repo = lerna_monorepo();
    let resolver = ProjectStructureResolver::with_defaults(real_fs());

    let structure = resolver
        .resolve(&repo.path("other-packages-root/package-two-dir"))
        .await
        .unwrap();
    assert!(structure.is_monorepo);
    assert_eq!(structure.root_directory, repo.root());
    assert_eq!(
        structure.package_directories,
        vec![
            repo.path("packages/package-one-dir"),
            repo.path("other-packages-root/package-two-dir"),
        ]
    );
}

#[tokio::test]
async fn test_walker_orders_matches_root_first() {
    let repo = lerna_monorepo();
    let walker = DirectoryWalker::new(real_fs(), repo.path("packages/package-one-dir"))
        .with_stop_directory(repo.root());

    let manifests = walker.find_all_files("package.json").await;
    assert_eq!(
        manifests,
        vec![
            repo.path("package.json"),
            repo.path("packages/package-one-dir/package.json"),
        ]
    );
    assert_eq!(
        walker.find_first_file("lerna.json").await,
        Some(repo.path("lerna.json"))
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_globstar_does_not_follow_symlink_cycles() {
    let repo = TestRepo::new(&[
        ("package.json", r#"{"name": "root", "workspaces": ["packages/**"]}"#),
        ("packages/a/package.json", r#"{"name": "a"}"#),
        ("packages/a/src/index.ts", "export {};\n"),
    ]);
    std::os::unix::fs::symlink(repo.path("packages"), repo.path("packages/a/loop")).unwrap();

    let project = create(&repo, "").await.unwrap();
    assert_eq!(names(&project), vec!["a"]);
    assert_eq!(
        project.packages()[0].directory,
        repo.path("packages/a")
    );
}
