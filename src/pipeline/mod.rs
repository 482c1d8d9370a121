pub mod build_step;
pub mod context;
pub mod options;
pub mod runner;
pub mod task;

pub use build_step::{
    BuildConfiguration, BuildStep, BuildStepPipeline, BuildTask, PackageBuildStep, PerPackage,
    INITIAL_DIRECTORY,
};
pub use context::TaskContext;
pub use options::{Configuration, ConfigurationOption, OptionError, OptionRegistry, OptionType};
pub use runner::{PipelineState, TaskPipeline};
pub use task::{error, success, Outcome, Task, TaskResult};
