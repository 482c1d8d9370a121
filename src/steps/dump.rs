use crate::cli::output::{OutputFormat, OutputFormatter, ProjectSummary};
use crate::model::Project;
use crate::pipeline::{BuildConfiguration, BuildStep, ConfigurationOption, OptionRegistry, OptionType};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::debug;

pub const FORMAT_OPTION: &str = "format";

/// Prints the resolved project.
pub struct Dump {
    writer: Arc<Mutex<dyn Write + Send>>,
}

impl Dump {
    /// Writes to stdout.
    pub fn new() -> Self {
        Self::with_writer(Arc::new(Mutex::new(io::stdout())))
    }

    pub fn with_writer(writer: Arc<Mutex<dyn Write + Send>>) -> Self {
        Self { writer }
    }

    fn output_format(configuration: &BuildConfiguration) -> Result<OutputFormat> {
        match configuration.option_str(FORMAT_OPTION) {
            None => Ok(OutputFormat::default()),
            Some(format) => format.parse().map_err(|e: String| anyhow!(e)),
        }
    }
}

impl Default for Dump {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildStep for Dump {
    fn name(&self) -> &str {
        "dump"
    }

    fn configuration_options(&self) -> OptionRegistry {
        OptionRegistry::new().with(
            FORMAT_OPTION,
            ConfigurationOption::new(
                OptionType::String,
                format!("output format ({})", OutputFormat::VARIANTS.join(", ")),
            )
            .with_default(OutputFormat::default().to_string()),
        )
    }

    async fn execute(&self, configuration: &BuildConfiguration, project: Arc<Project>) -> Result<Arc<Project>> {
        let format = Self::output_format(configuration)?;
        debug!(%format, "Dumping project");

        let output = OutputFormatter::new(format).format(&ProjectSummary::from_project(&project))?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow!("Output writer is poisoned"))?;
        writer
            .write_all(output.as_bytes())
            .context("Failed to write project dump")?;
        writer.flush().context("Failed to write project dump")?;

        Ok(project)
    }
}
