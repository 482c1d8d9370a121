//! Output formatting for multiple formats
//!
//! This module renders resolved projects as JSON, YAML, or human-readable
//! text, and renders pipeline failures for the terminal.
//!
//! # Example
//!
//! ```ignore
//! use thrasher::cli::output::{OutputFormat, OutputFormatter, ProjectSummary};
//!
//! let summary = ProjectSummary::from_project(&project);
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format(&summary)?);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::PipelineError;
use crate::model::{Package, Project};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    #[default]
    Human,
}

impl OutputFormat {
    pub const VARIANTS: [&'static str; 3] = ["json", "yaml", "human"];
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!(
                "Invalid output format: {}. Valid options: {}",
                s,
                Self::VARIANTS.join(", ")
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Human => "human",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub name: String,
    pub directory: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub dependencies: Vec<String>,
}

impl From<&Package> for PackageSummary {
    fn from(package: &Package) -> Self {
        Self {
            name: package.name().to_string(),
            directory: package.directory.clone(),
            version: package.manifest.version.clone(),
            dependencies: package.dependency_names().map(str::to_string).collect(),
        }
    }
}

/// What `dump` prints about a resolved project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(rename = "projectRootDir")]
    pub root_directory: PathBuf,
    pub initial_directory: PathBuf,
    pub is_monorepo: bool,
    pub packages: Vec<PackageSummary>,
    pub packages_to_build: Vec<String>,
}

impl ProjectSummary {
    pub fn from_project(project: &Project) -> Self {
        Self {
            root_directory: project.root_directory().to_path_buf(),
            initial_directory: project.initial_directory().to_path_buf(),
            is_monorepo: project.is_monorepo(),
            packages: project.packages().iter().map(PackageSummary::from).collect(),
            packages_to_build: project
                .packages_to_build()
                .into_iter()
                .map(|p| p.name().to_string())
                .collect(),
        }
    }
}

/// Output formatter for resolved projects
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, summary: &ProjectSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_json(summary),
            OutputFormat::Yaml => self.format_yaml(summary),
            OutputFormat::Human => Ok(self.format_human(summary)),
        }
    }

    fn format_json(&self, summary: &ProjectSummary) -> Result<String> {
        let mut output =
            serde_json::to_string_pretty(summary).context("Failed to serialize project to JSON")?;
        output.push('\n');
        Ok(output)
    }

    fn format_yaml(&self, summary: &ProjectSummary) -> Result<String> {
        serde_yaml::to_string(summary).context("Failed to serialize project to YAML")
    }

    fn format_human(&self, summary: &ProjectSummary) -> String {
        let mut output = String::new();

        if summary.is_monorepo {
            output.push_str("\u{2713} Monorepo Project\n");
        } else {
            output.push_str("\u{2713} Standalone Project\n");
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Root:        {}\n", summary.root_directory.display()));
        output.push_str(&format!("Invoked in:  {}\n\n", summary.initial_directory.display()));

        output.push_str(&format!("Packages ({}):\n", summary.packages.len()));
        for (i, package) in summary.packages.iter().enumerate() {
            let is_last = i == summary.packages.len() - 1;
            let connector = if is_last { "\u{2514}" } else { "\u{251C}" };
            let version = package
                .version
                .as_deref()
                .map(|v| format!(" {}", v))
                .unwrap_or_default();
            output.push_str(&format!(
                "{}\u{2500} {}{} ({})\n",
                connector,
                package.name,
                version,
                display_relative(&summary.root_directory, &package.directory)
            ));
            if !package.dependencies.is_empty() {
                let rail = if is_last { " " } else { "\u{2502}" };
                output.push_str(&format!(
                    "{}    depends on: {}\n",
                    rail,
                    package.dependencies.join(", ")
                ));
            }
        }
        output.push('\n');

        if summary.packages_to_build.is_empty() {
            output.push_str("To build: (none)\n");
        } else {
            output.push_str(&format!("To build: {}\n", summary.packages_to_build.join(", ")));
        }

        output
    }
}

fn display_relative(root: &Path, directory: &Path) -> String {
    match directory.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative.display().to_string(),
        Err(_) => directory.display().to_string(),
    }
}

/// The failure message framed by blank lines, followed by the debug
/// rendering when `details` is set.
pub fn format_failure(error: &PipelineError, details: bool) -> String {
    let mut output = format!("\n{}\n\n", error);
    if details {
        if let Some(details) = error.details() {
            output.push_str(&details);
            output.push('\n');
        }
    }
    output
}
