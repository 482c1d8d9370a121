//! Package glob resolution over the injected filesystem
//!
//! Monorepo configs declare their members as glob patterns relative to the
//! repository root (`packages/*`, `apps/**`). A pattern selects package
//! roots: directories whose relative path matches and that hold a
//! package.json. Symlinked directories are not followed. Each pattern is
//! resolved on its own: the union of all results keeps duplicates, in
//! pattern declaration order.

use crate::error::ProjectError;
use crate::fs::FileSystem;
use crate::model::MANIFEST_FILE;
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const SKIPPED_DIRECTORIES: &[&str] = &["node_modules"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Resolves every pattern relative to `root` and concatenates the matches.
pub async fn resolve_package_globs(
    file_system: &dyn FileSystem,
    root: &Path,
    patterns: &[String],
) -> Result<Vec<PathBuf>, ProjectError> {
    let mut directories = Vec::new();
    for pattern in patterns {
        let matches = resolve_glob(file_system, root, pattern).await?;
        debug!(pattern = %pattern, matches = matches.len(), "resolved package glob");
        directories.extend(matches);
    }
    Ok(directories)
}

/// Package directories under `root` whose relative path matches `pattern`,
/// sorted.
pub async fn resolve_glob(
    file_system: &dyn FileSystem,
    root: &Path,
    pattern: &str,
) -> Result<Vec<PathBuf>, ProjectError> {
    let normalized = normalize_pattern(pattern);
    let compiled = Pattern::new(&normalized).map_err(|source| ProjectError::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })?;

    let (prefix, max_depth) = literal_prefix(&normalized);
    let base = if prefix.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(&prefix)
    };
    if !file_system.is_dir(&base).await {
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    if base != root && compiled.matches_with(&to_slash(&prefix), MATCH_OPTIONS) {
        candidates.push(base.clone());
    }

    // Iterative walk; each entry carries its depth below `base`.
    let mut pending = vec![(base, 0usize)];
    while let Some((dir, depth)) = pending.pop() {
        if max_depth.map_or(false, |max| depth >= max) {
            continue;
        }

        let entries = file_system
            .read_dir(&dir)
            .await
            .map_err(|source| ProjectError::io(&dir, source))?;

        for entry in entries.into_iter().filter(|e| e.is_dir()) {
            let name = entry.file_name();
            if SKIPPED_DIRECTORIES.contains(&name) || name.starts_with('.') {
                continue;
            }

            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if compiled.matches_with(&to_slash(relative), MATCH_OPTIONS) {
                candidates.push(entry.path().to_path_buf());
            }
            pending.push((entry.path().to_path_buf(), depth + 1));
        }
    }

    let mut matches = Vec::new();
    for candidate in candidates {
        if file_system.is_file(&candidate.join(MANIFEST_FILE)).await {
            matches.push(candidate);
        }
    }
    matches.sort();
    Ok(matches)
}

fn normalize_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim().trim_start_matches("./").trim_end_matches('/');
    trimmed.to_string()
}

fn has_glob_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '[', ']', '{', '}'])
}

/// Splits a pattern into the literal directory prefix that can be joined
/// directly and the maximum walk depth below it (`None` when `**` appears).
fn literal_prefix(pattern: &str) -> (PathBuf, Option<usize>) {
    let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let literal_count = segments
        .iter()
        .take_while(|segment| !has_glob_meta(segment))
        .count();

    let prefix: PathBuf = segments[..literal_count].iter().collect();
    let rest = &segments[literal_count..];
    let max_depth = if rest.iter().any(|segment| segment.contains("**")) {
        None
    } else {
        Some(rest.len())
    };

    (prefix, max_depth)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectErrorKind;
    use crate::fs::MockFileSystem;

    fn repo() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/packages/glob-one/package.json", "{}");
        fs.add_file("/repo/packages/glob-two/package.json", "{}");
        fs.add_file("/repo/packages/readme.md", "");
        fs.add_file("/repo/globstar-test/middle/globstar-one/package.json", "{}");
        fs.add_file("/repo/globstar-test/other/path/globstar-two/package.json", "{}");
        fs.add_file("/repo/other/specific-package1/package.json", "{}");
        fs.add_file("/repo/packages/glob-one/node_modules/dep/package.json", "{}");
        fs
    }

    #[tokio::test]
    async fn test_single_star_matches_direct_children() {
        let fs = repo();
        let found = resolve_glob(&fs, Path::new("/repo"), "packages/*").await.unwrap();
        assert_eq!(
            found,
            vec![
                PathBuf::from("/repo/packages/glob-one"),
                PathBuf::from("/repo/packages/glob-two"),
            ]
        );
    }

    #[tokio::test]
    async fn test_literal_pattern_matches_existing_directory() {
        let fs = repo();
        let found = resolve_glob(&fs, Path::new("/repo"), "other/specific-package1")
            .await
            .unwrap();
        assert_eq!(found, vec![PathBuf::from("/repo/other/specific-package1")]);
    }

    #[tokio::test]
    async fn test_literal_pattern_missing_directory() {
        let fs = repo();
        let found = resolve_glob(&fs, Path::new("/repo"), "other/missing").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_globstar_descends_and_skips_node_modules() {
        let fs = repo();
        let found = resolve_glob(&fs, Path::new("/repo"), "globstar-test/**")
            .await
            .unwrap();
        assert!(found.contains(&PathBuf::from("/repo/globstar-test/middle/globstar-one")));
        assert!(found.contains(&PathBuf::from("/repo/globstar-test/other/path/globstar-two")));

        let all = resolve_glob(&fs, Path::new("/repo"), "**").await.unwrap();
        assert!(!all.iter().any(|p| p.to_string_lossy().contains("node_modules")));
    }

    #[tokio::test]
    async fn test_globstar_keeps_only_package_roots() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/packages/a/package.json", r#"{"name": "a"}"#);
        fs.add_file("/repo/packages/a/src/index.ts", "");
        fs.add_dir("/repo/packages/a/src/empty");
        fs.add_file("/repo/packages/group/b/package.json", r#"{"name": "b"}"#);

        let found = resolve_glob(&fs, Path::new("/repo"), "packages/**").await.unwrap();
        assert_eq!(
            found,
            vec![
                PathBuf::from("/repo/packages/a"),
                PathBuf::from("/repo/packages/group/b"),
            ]
        );
    }

    #[tokio::test]
    async fn test_directory_without_manifest_is_not_a_package() {
        let fs = repo();
        fs.add_dir("/repo/packages/docs");

        let found = resolve_glob(&fs, Path::new("/repo"), "packages/*").await.unwrap();
        assert!(!found.contains(&PathBuf::from("/repo/packages/docs")));
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_union_preserves_duplicates() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/packages/foo/package.json", "{}");
        fs.add_file("/repo/packages/bar/package.json", "{}");

        let patterns = vec!["packages/*".to_string(), "packages/foo".to_string()];
        let found = resolve_package_globs(&fs, Path::new("/repo"), &patterns)
            .await
            .unwrap();
        assert_eq!(
            found,
            vec![
                PathBuf::from("/repo/packages/bar"),
                PathBuf::from("/repo/packages/foo"),
                PathBuf::from("/repo/packages/foo"),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_patterns_no_packages() {
        let fs = repo();
        let found = resolve_package_globs(&fs, Path::new("/repo"), &[]).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_pattern() {
        let fs = repo();
        let err = resolve_glob(&fs, Path::new("/repo"), "packages/[")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProjectErrorKind::InvalidGlob);
    }

    #[tokio::test]
    async fn test_leading_dot_slash_is_ignored() {
        let fs = repo();
        let found = resolve_glob(&fs, Path::new("/repo"), "./packages/*/").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(
            literal_prefix("packages/*"),
            (PathBuf::from("packages"), Some(1))
        );
        assert_eq!(
            literal_prefix("globstar-test/**"),
            (PathBuf::from("globstar-test"), None)
        );
        assert_eq!(
            literal_prefix("other/specific-package1"),
            (PathBuf::from("other/specific-package1"), Some(0))
        );
    }
}
