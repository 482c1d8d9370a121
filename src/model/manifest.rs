//! package.json parsing and validation

use crate::error::ProjectError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub const MANIFEST_FILE: &str = "package.json";

/// npm/yarn `workspaces` declaration: either a plain pattern list or an
/// object with a `packages` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Workspaces {
    Patterns(Vec<String>),
    Config {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl Workspaces {
    pub fn patterns(&self) -> &[String] {
        match self {
            Workspaces::Patterns(patterns) => patterns,
            Workspaces::Config { packages } => packages,
        }
    }
}

/// Validated contents of a package.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspaces: Option<Workspaces>,
}

impl PackageManifest {
    /// Parses and validates manifest text read from `path` in `directory`.
    ///
    /// Invalid JSON is a [`ProjectError::ManifestParse`]; JSON of the wrong
    /// shape (no `name`, empty `name`, non-string dependency ranges) is a
    /// [`ProjectError::ManifestValidation`].
    pub fn parse(content: &str, directory: &Path, path: &Path) -> Result<Self, ProjectError> {
        let value: Value =
            serde_json::from_str(content).map_err(|source| ProjectError::parse(path, source))?;
        Self::from_value(value, directory, path)
    }

    pub fn from_value(value: Value, directory: &Path, path: &Path) -> Result<Self, ProjectError> {
        let invalid = |reason: String| ProjectError::ManifestValidation {
            directory: directory.to_path_buf(),
            path: path.to_path_buf(),
            reason,
        };

        if !value.is_object() {
            return Err(invalid("manifest must be a JSON object".to_string()));
        }

        let manifest: PackageManifest =
            serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;

        if manifest.name.trim().is_empty() {
            return Err(invalid("field `name` must not be empty".to_string()));
        }

        Ok(manifest)
    }

    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }
}
