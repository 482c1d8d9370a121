use thrasher::cli::commands::{CommandSet, EXIT_FAILURE, LOG_LEVEL_ARG, QUIET_ARG, VERBOSE_ARG};
use thrasher::fs::{FileSystem, RealFileSystem};
use thrasher::model::ProjectFactory;
use thrasher::util::logging::{init_logging, json_from_env, level_from_flags, LoggingConfig};
use thrasher::{ThrasherConfig, VERSION};

use clap::ArgMatches;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    let config = ThrasherConfig::default();

    let file_system: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let factory = Arc::new(ProjectFactory::with_defaults(file_system));
    let mut commands = CommandSet::standard(factory, &config, Arc::new(Mutex::new(io::stdout())));

    let command = match commands.command() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };
    let matches = match command.try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            std::process::exit(e.exit_code());
        }
    };

    init_logging_from_args(&matches, &config);

    debug!("thrasher v{} starting", VERSION);
    debug!("{}", config);

    if let Err(e) = config.validate() {
        error!("{}", e);
        eprintln!("\n{}\n", e);
        std::process::exit(EXIT_FAILURE);
    }

    let exit_code = commands.execute(&matches).await;
    std::process::exit(exit_code);
}

fn init_logging_from_args(matches: &ArgMatches, config: &ThrasherConfig) {
    let level = level_from_flags(
        matches.get_one::<String>(LOG_LEVEL_ARG).map(String::as_str),
        matches.get_flag(VERBOSE_ARG),
        matches.get_flag(QUIET_ARG),
        &config.log_level,
    );

    init_logging(LoggingConfig {
        use_json: json_from_env(),
        ..LoggingConfig::with_level(level)
    });
}
