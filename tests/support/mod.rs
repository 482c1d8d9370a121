//! Shared helpers for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch repository on disk. Paths are canonical so they compare equal
/// to what the real filesystem reports.
pub struct TestRepo {
    _dir: TempDir,
    root: PathBuf,
}

impl TestRepo {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp dir");
        let repo = Self { _dir: dir, root };
        for (path, content) in files {
            repo.write(path, content);
        }
        repo
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    pub fn mkdir(&self, relative: &str) {
        fs::create_dir_all(self.path(relative)).expect("Failed to create directory");
    }

    pub fn read_json(&self, relative: &str) -> serde_json::Value {
        let content = fs::read_to_string(self.path(relative)).expect("Failed to read file");
        serde_json::from_str(&content).expect("File is not valid JSON")
    }
}

/// Lerna monorepo with two packages in different glob roots, the first
/// depending on the second.
pub fn lerna_monorepo() -> TestRepo {
    TestRepo::new(&[
        (
            "lerna.json",
            r#"{"packages": ["packages/*", "other-packages-root/*"]}"#,
        ),
        ("package.json", r#"{"name": "root", "private": true}"#),
        (
            "packages/package-one-dir/package.json",
            r#"{"name": "package-one", "version": "1.0.0", "dependencies": {"@scope/package-two": "^1.0.0"}}"#,
        ),
        (
            "other-packages-root/package-two-dir/package.json",
            r#"{"name": "@scope/package-two", "version": "1.0.0"}"#,
        ),
    ])
}

/// npm/yarn workspaces monorepo using the object form of `workspaces`.
pub fn workspaces_monorepo() -> TestRepo {
    TestRepo::new(&[
        (
            "package.json",
            r#"{"name": "root", "workspaces": {"packages": ["packages/*"]}}"#,
        ),
        ("packages/a/package.json", r#"{"name": "a"}"#),
        (
            "packages/b/package.json",
            r#"{"name": "b", "dependencies": {"a": "*", "left-pad": "^1.0.0"}}"#,
        ),
    ])
}

pub fn standalone_package() -> TestRepo {
    TestRepo::new(&[
        ("package.json", r#"{"name": "my-package", "version": "0.1.0"}"#),
        ("src/index.ts", "export const answer = 42;\n"),
    ])
}
