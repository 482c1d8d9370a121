//! TypeScript project configuration generation
//!
//! Writes a project-level `tsconfig.json` into the output directory under
//! the project root, and one `tsconfig.json` per package in scope that
//! extends it. Options thrasher manages itself may not be set in the
//! user's own root `tsconfig.json`.

use crate::config::ThrasherConfig;
use crate::error::ProjectError;
use crate::fs::FileSystem;
use crate::model::{Package, Project};
use crate::pipeline::{BuildConfiguration, PackageBuildStep};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TSCONFIG_FILE: &str = "tsconfig.json";

/// Compiler options thrasher sets in generated configuration
pub const FORBIDDEN_OPTIONS: [&str; 8] = [
    "baseUrl",
    "composite",
    "declaration",
    "isolatedModules",
    "module",
    "noEmit",
    "noEmitOnError",
    "paths",
];

pub struct CreateTsConfigs {
    output_dir: PathBuf,
    dist_dir: String,
}

impl CreateTsConfigs {
    pub fn new(output_dir: impl Into<PathBuf>, dist_dir: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            dist_dir: dist_dir.into(),
        }
    }

    pub fn from_config(config: &ThrasherConfig) -> Self {
        Self::new(config.output_dir.clone(), config.dist_dir.clone())
    }

    pub fn root_config_path(&self, project: &Project) -> PathBuf {
        project
            .root_directory()
            .join(&self.output_dir)
            .join(TSCONFIG_FILE)
    }

    /// Rejects a user config that sets an option thrasher manages, either at
    /// the top level or under `compilerOptions`.
    pub fn check_user_config(config: &Value, path: &Path) -> Result<(), ProjectError> {
        let Some(config) = config.as_object() else {
            return Err(ProjectError::ManifestValidation {
                directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
                path: path.to_path_buf(),
                reason: "tsconfig.json must be a JSON object".to_string(),
            });
        };
        let compiler_options = config.get("compilerOptions").and_then(Value::as_object);

        let forbidden = FORBIDDEN_OPTIONS.iter().find(|option| {
            config.contains_key(**option)
                || compiler_options.map_or(false, |c| c.contains_key(**option))
        });

        match forbidden {
            Some(option) => Err(ProjectError::ConstraintViolation {
                field: option.to_string(),
                value: path.display().to_string(),
                message: format!(
                    "The tsconfig.json option '{}' cannot be set, because it will be overridden by thrasher (in {})",
                    option,
                    path.display()
                ),
            }),
            None => Ok(()),
        }
    }

    pub fn root_tsconfig(&self, project: &Project, extends_user_config: bool) -> Value {
        let config_dir = project.root_directory().join(&self.output_dir);

        let mut compiler_options = json!({
            "baseUrl": to_slash(&relative_path(&config_dir, project.root_directory())),
            "composite": true,
            "declaration": true,
            "isolatedModules": true,
            "module": "es6",
            "noEmit": true,
            "noEmitOnError": true,
        });

        if project.is_monorepo() {
            let paths: Map<String, Value> = project
                .packages()
                .iter()
                .map(|package| {
                    let source = relative_path(project.root_directory(), &package.directory).join("src");
                    (package.name().to_string(), json!([to_slash(&source)]))
                })
                .collect();
            compiler_options["paths"] = Value::Object(paths);
        }

        let references: Vec<Value> = project
            .packages_to_build()
            .into_iter()
            .map(|package| json!({ "path": dot_relative(&config_dir, &package.directory) }))
            .collect();

        let mut config = json!({
            "compilerOptions": compiler_options,
            "references": references,
        });
        if extends_user_config {
            config["extends"] = json!(dot_relative(&config_dir, &project.root_directory().join(TSCONFIG_FILE)));
        }
        config
    }

    pub fn package_tsconfig(&self, project: &Project, package: &Package) -> Value {
        let references: Vec<Value> = package
            .dependency_names()
            .filter_map(|name| project.package_by_name(name))
            .filter(|dependency| dependency.directory != package.directory)
            .map(|dependency| json!({ "path": dot_relative(&package.directory, &dependency.directory) }))
            .collect();

        json!({
            "extends": dot_relative(&package.directory, &self.root_config_path(project)),
            "compilerOptions": {
                "declarationDir": self.dist_dir,
                "outDir": self.dist_dir,
                "rootDir": "./src",
            },
            "include": ["src"],
            "references": references,
        })
    }
}

#[async_trait]
impl PackageBuildStep for CreateTsConfigs {
    fn name(&self) -> &str {
        "create-tsconfigs"
    }

    async fn before_packages(&self, _configuration: &BuildConfiguration, project: &Project) -> Result<()> {
        let user_config_path = project.root_directory().join(TSCONFIG_FILE);
        let user_config = project.read_json_file(TSCONFIG_FILE).await?;
        if let Some(config) = &user_config {
            Self::check_user_config(config, &user_config_path)?;
        }

        let root_config = self.root_tsconfig(project, user_config.is_some());
        let path = self.root_config_path(project);
        if let Some(parent) = path.parent() {
            project
                .file_system()
                .create_dir_all(parent)
                .await
                .map_err(|e| ProjectError::io(parent, e))?;
        }
        write_json(project.file_system().as_ref(), &path, &root_config).await?;

        info!(
            path = %path.display(),
            extends_user_config = user_config.is_some(),
            "Wrote project tsconfig"
        );
        Ok(())
    }

    async fn execute_for_package(
        &self,
        _configuration: &BuildConfiguration,
        project: &Project,
        package: &Package,
    ) -> Result<()> {
        let path = package.directory.join(TSCONFIG_FILE);
        let config = self.package_tsconfig(project, package);
        write_json(project.file_system().as_ref(), &path, &config).await?;

        debug!(package = package.name(), path = %path.display(), "Wrote package tsconfig");
        Ok(())
    }
}

async fn write_json(file_system: &dyn FileSystem, path: &Path, value: &Value) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    content.push('\n');
    file_system
        .write(path, content.as_bytes())
        .await
        .map_err(|e| ProjectError::io(path, e))?;
    Ok(())
}

fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    pathdiff::diff_paths(to, from_dir).unwrap_or_else(|| to.to_path_buf())
}

fn to_slash(path: &Path) -> String {
    let joined = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Relative path usable in `extends`/`references`: always starts with `.`
fn dot_relative(from_dir: &Path, to: &Path) -> String {
    let relative = to_slash(&relative_path(from_dir, to));
    if relative == "." || relative.starts_with("./") || relative.starts_with("../") || relative == ".." {
        relative
    } else {
        format!("./{}", relative)
    }
}
