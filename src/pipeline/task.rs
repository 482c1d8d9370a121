use super::context::TaskContext;
use super::options::{Configuration, OptionRegistry};
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

/// What a task reports back to the pipeline
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub outcome: Outcome,
    pub context: TaskContext,
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

pub fn success(context: TaskContext) -> TaskResult {
    TaskResult {
        outcome: Outcome::Success,
        context,
    }
}

pub fn error(context: TaskContext) -> TaskResult {
    TaskResult {
        outcome: Outcome::Error,
        context,
    }
}

/// One unit of a command's pipeline.
///
/// A declared failure is an `Ok` result built with [`error`]; returning
/// `Err` is reserved for faults outside that protocol.
#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &str;

    /// Options this task reads from the configuration
    fn configuration_options(&self) -> OptionRegistry {
        OptionRegistry::default()
    }

    async fn execute(&self, configuration: &Configuration, context: &TaskContext) -> Result<TaskResult>;
}
