pub mod commands;
pub mod output;

pub use commands::{CommandSet, EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE};
pub use output::{OutputFormat, OutputFormatter, ProjectSummary};
