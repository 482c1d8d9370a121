//! Configuration management for thrasher
//!
//! Settings are loaded from environment variables with sensible defaults.
//! Per-invocation parameters (such as the starting directory) come from the
//! command line instead; see [`crate::pipeline::BuildConfiguration`].
//!
//! # Environment Variables
//!
//! - `THRASHER_LOG_LEVEL`: Logging level - default: "info"
//! - `THRASHER_OUTPUT_DIR`: Directory, relative to the project root, that
//!   receives generated project-level files - default: ".thrasher"
//! - `THRASHER_DIST_DIR`: Package build output directory written into
//!   generated compiler configuration - default: "./dist/module"
//!
//! # Example
//!
//! ```no_run
//! use thrasher::ThrasherConfig;
//!
//! let config = ThrasherConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Component, PathBuf};
use thiserror::Error;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_OUTPUT_DIR: &str = ".thrasher";
pub const DEFAULT_DIST_DIR: &str = "./dist/module";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Unknown log level
    #[error("Invalid log level: {0}. Valid options: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrasherConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Generated project-level files go to `<root>/<output_dir>`
    pub output_dir: PathBuf,

    /// Build output directory of each package, relative to the package
    pub dist_dir: String,
}

impl Default for ThrasherConfig {
    /// Loads from `THRASHER_*` environment variables, falling back to
    /// defaults for anything unset.
    fn default() -> Self {
        let log_level = env::var("THRASHER_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let output_dir = env::var("THRASHER_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let dist_dir = env::var("THRASHER_DIST_DIR").unwrap_or_else(|_| DEFAULT_DIST_DIR.to_string());

        Self {
            log_level,
            output_dir,
            dist_dir,
        }
    }
}

impl ThrasherConfig {
    /// Validates the configuration
    ///
    /// The output directory must be a non-empty relative path that stays
    /// inside the project root; the dist directory must be non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Output directory must not be empty".to_string(),
            ));
        }
        if self.output_dir.is_absolute()
            || self
                .output_dir
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "Output directory must be relative to the project root: {}",
                self.output_dir.display()
            )));
        }

        if self.dist_dir.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Dist directory must not be empty".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        Ok(())
    }

    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert(
            "output_dir".to_string(),
            self.output_dir.display().to_string(),
        );
        map.insert("dist_dir".to_string(), self.dist_dir.clone());
        map
    }
}

impl fmt::Display for ThrasherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Thrasher Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Output Dir: {}", self.output_dir.display())?;
        writeln!(f, "  Dist Dir: {}", self.dist_dir)?;
        Ok(())
    }
}
