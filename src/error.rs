//! Error types for project resolution and pipeline execution

use serde_json::Value;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`ProjectError`], for callers that need to
/// branch on the kind of failure rather than its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectErrorKind {
    ManifestNotFound,
    ManifestParse,
    ManifestValidation,
    PackageFileParse,
    ConstraintViolation,
    InvalidGlob,
    Io,
}

/// Failures while resolving a project or generating files from it
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("package.json not found: {} (in package: {})", path.display(), directory.display())]
    ManifestNotFound { directory: PathBuf, path: PathBuf },

    #[error("File '{}' does not contain valid JSON: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid manifest structure in {}: {reason} (in package: {})", path.display(), directory.display())]
    ManifestValidation {
        directory: PathBuf,
        path: PathBuf,
        reason: String,
    },

    #[error("File '{}' in package {package} does not contain valid JSON: {source}", path.display())]
    PackageFileParse {
        package: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    ConstraintViolation {
        field: String,
        value: String,
        message: String,
    },

    #[error("Invalid package glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProjectError {
    pub fn kind(&self) -> ProjectErrorKind {
        match self {
            ProjectError::ManifestNotFound { .. } => ProjectErrorKind::ManifestNotFound,
            ProjectError::ManifestParse { .. } => ProjectErrorKind::ManifestParse,
            ProjectError::ManifestValidation { .. } => ProjectErrorKind::ManifestValidation,
            ProjectError::PackageFileParse { .. } => ProjectErrorKind::PackageFileParse,
            ProjectError::ConstraintViolation { .. } => ProjectErrorKind::ConstraintViolation,
            ProjectError::InvalidGlob { .. } => ProjectErrorKind::InvalidGlob,
            ProjectError::Io { .. } => ProjectErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProjectError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        ProjectError::ManifestParse {
            path: path.into(),
            source,
        }
    }
}

/// Failures surfaced by a task pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A task reported an `error` result
    #[error("{}", failure_message(.task, .context))]
    TaskFailed { task: String, context: Value },

    /// A task failed outside the declared result protocol
    #[error("Task {task} failed: {source}")]
    Unhandled {
        task: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn task(&self) -> &str {
        match self {
            PipelineError::TaskFailed { task, .. } | PipelineError::Unhandled { task, .. } => task,
        }
    }

    /// Debug rendering of the failure including its cause chain, and the
    /// backtrace when one was captured. Declared failures carry it under
    /// `details` in their context.
    pub fn details(&self) -> Option<String> {
        match self {
            PipelineError::Unhandled { source, .. } => Some(format!("{:?}", source)),
            PipelineError::TaskFailed { context, .. } => context
                .get("details")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

fn failure_message(task: &str, context: &Value) -> String {
    match context.get("error").and_then(Value::as_str) {
        Some(message) => message.to_string(),
        None => format!("Failed executing task: {}", task),
    }
}
