//! Build steps and their adaptation into pipeline tasks
//!
//! A [`BuildStep`] works on a resolved [`Project`]. [`BuildTask`] wraps a
//! step so it can run inside a [`super::TaskPipeline`]: it resolves the
//! project on first use, reuses the one left in the context by an earlier
//! task, and turns step failures into declared error results.

use super::context::TaskContext;
use super::options::{Configuration, ConfigurationOption, OptionError, OptionRegistry, OptionType};
use super::task::{error, success, Task, TaskResult};
use crate::error::ProjectError;
use crate::model::{Package, Project, ProjectFactory};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub const INITIAL_DIRECTORY: &str = "initialDirectory";

/// Per-invocation parameters shared by every build step
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfiguration {
    /// Monorepo root or package directory the build starts in
    pub initial_directory: PathBuf,
    /// Every parsed option, for steps that declare their own
    pub options: Configuration,
}

impl BuildConfiguration {
    pub fn new(initial_directory: impl Into<PathBuf>) -> Self {
        Self {
            initial_directory: initial_directory.into(),
            options: Configuration::new(),
        }
    }

    pub fn with_options(mut self, options: Configuration) -> Self {
        self.options = options;
        self
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Reads `initialDirectory`, defaulting to the working directory.
    /// Relative paths are taken relative to the working directory.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self> {
        let current_dir =
            || std::env::current_dir().context("Failed to determine the current working directory");

        let initial_directory = match configuration.get(INITIAL_DIRECTORY) {
            None | Some(Value::Null) => current_dir()?,
            Some(Value::String(directory)) => PathBuf::from(directory),
            Some(other) => bail!("Option '{}' must be a path, got {}", INITIAL_DIRECTORY, other),
        };

        let initial_directory = if initial_directory.is_absolute() {
            initial_directory
        } else {
            current_dir()?.join(initial_directory)
        };
        Ok(Self::new(initial_directory).with_options(configuration.clone()))
    }
}

#[async_trait]
pub trait BuildStep: Send + Sync {
    fn name(&self) -> &str;

    fn configuration_options(&self) -> OptionRegistry {
        OptionRegistry::default()
    }

    /// Resolves only after all of the step's effects have completed.
    async fn execute(&self, configuration: &BuildConfiguration, project: Arc<Project>) -> Result<Arc<Project>>;
}

/// A step that runs once per package in scope, after a project-wide hook.
#[async_trait]
pub trait PackageBuildStep: Send + Sync {
    fn name(&self) -> &str;

    fn configuration_options(&self) -> OptionRegistry {
        OptionRegistry::default()
    }

    async fn before_packages(&self, _configuration: &BuildConfiguration, _project: &Project) -> Result<()> {
        Ok(())
    }

    async fn execute_for_package(
        &self,
        configuration: &BuildConfiguration,
        project: &Project,
        package: &Package,
    ) -> Result<()>;
}

/// Runs a [`PackageBuildStep`] over `packages_to_build()` in order.
pub struct PerPackage<S>(pub S);

#[async_trait]
impl<S: PackageBuildStep> BuildStep for PerPackage<S> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn configuration_options(&self) -> OptionRegistry {
        self.0.configuration_options()
    }

    async fn execute(&self, configuration: &BuildConfiguration, project: Arc<Project>) -> Result<Arc<Project>> {
        self.0.before_packages(configuration, &project).await?;

        for package in project.packages_to_build() {
            debug!(step = self.0.name(), package = package.name(), "Building package");
            self.0
                .execute_for_package(configuration, &project, package)
                .await?;
        }
        Ok(project)
    }
}

/// Threads a project through steps one at a time.
pub struct BuildStepPipeline {
    name: String,
    steps: Vec<Box<dyn BuildStep>>,
    options: OptionRegistry,
}

impl BuildStepPipeline {
    /// Fails when two steps declare the same option with different types.
    /// Same-typed redeclarations keep the later step's descriptor.
    pub fn new(name: impl Into<String>, steps: Vec<Box<dyn BuildStep>>) -> Result<Self, OptionError> {
        let registries: Vec<OptionRegistry> = steps.iter().map(|step| step.configuration_options()).collect();
        let options = OptionRegistry::merged(&registries)?;
        Ok(Self {
            name: name.into(),
            steps,
            options,
        })
    }
}

#[async_trait]
impl BuildStep for BuildStepPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn configuration_options(&self) -> OptionRegistry {
        self.options.clone()
    }

    async fn execute(&self, configuration: &BuildConfiguration, project: Arc<Project>) -> Result<Arc<Project>> {
        let mut project = project;
        for step in &self.steps {
            debug!(pipeline = %self.name, step = step.name(), "Executing build step");
            project = step.execute(configuration, project).await?;
        }
        Ok(project)
    }
}

/// Adapts a [`BuildStep`] into a [`Task`].
pub struct BuildTask {
    step: Box<dyn BuildStep>,
    factory: Arc<ProjectFactory>,
}

impl BuildTask {
    pub fn new(step: Box<dyn BuildStep>, factory: Arc<ProjectFactory>) -> Self {
        Self { step, factory }
    }

    async fn build(&self, configuration: &BuildConfiguration, context: &TaskContext) -> Result<Arc<Project>> {
        let project = match context.project() {
            Some(project) => project.clone(),
            None => {
                let directory = &configuration.initial_directory;
                let directory = self
                    .factory
                    .file_system()
                    .canonicalize(directory)
                    .await
                    .map_err(|e| ProjectError::io(directory, e))?;
                info!(directory = %directory.display(), "Resolving project");
                Arc::new(self.factory.create_project(&directory).await?)
            }
        };

        let configuration = BuildConfiguration::new(project.initial_directory())
            .with_options(configuration.options.clone());
        self.step.execute(&configuration, project).await
    }
}

#[async_trait]
impl Task for BuildTask {
    fn name(&self) -> &str {
        self.step.name()
    }

    fn configuration_options(&self) -> OptionRegistry {
        self.step.configuration_options().with(
            INITIAL_DIRECTORY,
            ConfigurationOption::new(OptionType::Path, "the directory to start the build in")
                .with_default_description("the current working directory of the build process")
                .with_alias("initial-directory"),
        )
    }

    async fn execute(&self, configuration: &Configuration, context: &TaskContext) -> Result<TaskResult> {
        let build_configuration = BuildConfiguration::from_configuration(configuration)?;

        match self.build(&build_configuration, context).await {
            Ok(project) => Ok(success(TaskContext::new().with_project(project))),
            Err(e) => {
                debug!(step = self.step.name(), error = ?e, "Build step failed");
                Ok(error(
                    TaskContext::new()
                        .with("error", e.to_string())
                        .with("details", format!("{:?}", e)),
                ))
            }
        }
    }
}
