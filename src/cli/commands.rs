//! Command-line surface
//!
//! Every command is a named [`TaskPipeline`]. Its flags are not declared by
//! hand: they come from the merged option registry of the pipeline's tasks,
//! so a step that declares an option gets a flag for it.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, Level};

use super::output::format_failure;
use crate::config::ThrasherConfig;
use crate::model::ProjectFactory;
use crate::pipeline::{
    BuildTask, Configuration, ConfigurationOption, OptionError, OptionRegistry, OptionType,
    PerPackage, Task, TaskPipeline,
};
use crate::progress::{LoggingHandler, ProgressHandler};
use crate::steps::{CreateTsConfigs, Dump};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

pub const LOG_LEVEL_ARG: &str = "log-level";
pub const VERBOSE_ARG: &str = "verbose";
pub const QUIET_ARG: &str = "quiet";

struct PipelineCommand {
    about: String,
    pipeline: TaskPipeline,
}

/// Named pipelines exposed as subcommands
#[derive(Default)]
pub struct CommandSet {
    commands: Vec<PipelineCommand>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, about: impl Into<String>, pipeline: TaskPipeline) -> Self {
        self.commands.push(PipelineCommand {
            about: about.into(),
            pipeline,
        });
        self
    }

    /// `dump`, `create-tsconfigs` and `build`, with `dump` output going to
    /// `output`.
    pub fn standard(
        factory: Arc<ProjectFactory>,
        config: &ThrasherConfig,
        output: Arc<Mutex<dyn Write + Send>>,
    ) -> Self {
        let progress: Arc<dyn ProgressHandler> = Arc::new(LoggingHandler);
        let create_tsconfigs = || -> Box<dyn Task> {
            Box::new(BuildTask::new(
                Box::new(PerPackage(CreateTsConfigs::from_config(config))),
                factory.clone(),
            ))
        };
        let dump = || -> Box<dyn Task> {
            Box::new(BuildTask::new(
                Box::new(Dump::with_writer(output.clone())),
                factory.clone(),
            ))
        };

        Self::new()
            .with_command(
                "Resolve the project and print its structure",
                TaskPipeline::new("dump", vec![dump()]).with_progress_handler(progress.clone()),
            )
            .with_command(
                "Generate TypeScript project configuration for the packages in scope",
                TaskPipeline::new("create-tsconfigs", vec![create_tsconfigs()])
                    .with_progress_handler(progress.clone()),
            )
            .with_command(
                "Generate TypeScript project configuration, then print the project",
                TaskPipeline::new("build", vec![create_tsconfigs(), dump()])
                    .with_progress_handler(progress),
            )
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.pipeline.name()).collect()
    }

    /// Builds the clap command tree. Fails when two tasks of one pipeline
    /// declare the same option with different types.
    pub fn command(&self) -> Result<Command, OptionError> {
        let mut command = Command::new(crate::NAME)
            .version(crate::VERSION)
            .about("Monorepo-aware build orchestration")
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                Arg::new(LOG_LEVEL_ARG)
                    .long(LOG_LEVEL_ARG)
                    .global(true)
                    .value_name("LEVEL")
                    .help("Set logging level"),
            )
            .arg(
                Arg::new(VERBOSE_ARG)
                    .short('v')
                    .long(VERBOSE_ARG)
                    .global(true)
                    .action(ArgAction::SetTrue)
                    .help("Enable debug logging"),
            )
            .arg(
                Arg::new(QUIET_ARG)
                    .short('q')
                    .long(QUIET_ARG)
                    .global(true)
                    .action(ArgAction::SetTrue)
                    .conflicts_with(VERBOSE_ARG)
                    .help("Quiet mode - suppress non-error output"),
            );

        for entry in &self.commands {
            let options = entry.pipeline.configuration_options()?;
            let mut subcommand =
                Command::new(entry.pipeline.name().to_string()).about(entry.about.clone());
            for (key, option) in options.iter() {
                subcommand = subcommand.arg(option_arg(key, option));
            }
            command = command.subcommand(subcommand);
        }
        Ok(command)
    }

    /// Runs the pipeline named by the parsed subcommand and maps the
    /// outcome to an exit code.
    pub async fn execute(&mut self, matches: &ArgMatches) -> i32 {
        let Some((name, sub_matches)) = matches.subcommand() else {
            eprintln!("error: a command is required");
            return EXIT_USAGE;
        };
        let Some(entry) = self.commands.iter_mut().find(|c| c.pipeline.name() == name) else {
            eprintln!("error: unknown command '{}'", name);
            return EXIT_USAGE;
        };

        let configuration = match entry
            .pipeline
            .configuration_options()
            .and_then(|options| parse_configuration(&options, sub_matches))
        {
            Ok(configuration) => configuration,
            Err(e) => {
                eprintln!("error: {}", e);
                return EXIT_USAGE;
            }
        };
        debug!(command = name, ?configuration, "Parsed configuration");

        match entry.pipeline.run(&configuration).await {
            Ok(_) => EXIT_SUCCESS,
            Err(e) => {
                error!(task = e.task(), "Pipeline failed");
                eprint!("{}", format_failure(&e, tracing::enabled!(Level::DEBUG)));
                EXIT_FAILURE
            }
        }
    }

    /// Parses `args` (including the program name) and executes.
    pub async fn run<I, T>(&mut self, args: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let command = match self.command() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("error: {}", e);
                return EXIT_FAILURE;
            }
        };
        match command.try_get_matches_from(args) {
            Ok(matches) => self.execute(&matches).await,
            Err(e) => {
                let _ = e.print();
                e.exit_code()
            }
        }
    }
}

fn option_arg(key: &str, option: &ConfigurationOption) -> Arg {
    let mut arg = Arg::new(key.to_string())
        .long(key.to_string())
        .action(ArgAction::Set)
        .help(option_help(option));

    arg = match option.option_type {
        OptionType::Boolean => arg
            .value_name("BOOL")
            .num_args(0..=1)
            .default_missing_value("true"),
        OptionType::Number => arg.value_name("NUMBER"),
        OptionType::Path => arg.value_name("PATH"),
        OptionType::String => arg.value_name("VALUE"),
    };

    for alias in &option.aliases {
        arg = arg.visible_alias(alias.clone());
    }
    arg
}

fn option_help(option: &ConfigurationOption) -> String {
    match (&option.default_description, &option.default) {
        (Some(description), _) => format!("{} [default: {}]", option.description, description),
        (None, Some(serde_json::Value::String(default))) => {
            format!("{} [default: {}]", option.description, default)
        }
        (None, Some(default)) => format!("{} [default: {}]", option.description, default),
        (None, None) => option.description.clone(),
    }
}

/// Converts the values given on the command line into typed option values,
/// then fills in declared defaults.
pub fn parse_configuration(
    options: &OptionRegistry,
    matches: &ArgMatches,
) -> Result<Configuration, OptionError> {
    let mut configuration = Configuration::new();
    for (key, option) in options.iter() {
        if let Some(raw) = matches.get_one::<String>(key) {
            configuration.insert(key.to_string(), option.parse_value(key, raw)?);
        }
    }
    Ok(options.apply_defaults(configuration))
}
