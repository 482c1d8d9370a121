use super::context::TaskContext;
use super::options::{Configuration, OptionError, OptionRegistry};
use super::task::Task;
use crate::error::PipelineError;
use crate::progress::{ProgressEvent, ProgressHandler};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Running(usize),
    Succeeded,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed)
    }
}

/// Runs tasks strictly one after another, threading a merged context.
///
/// The first task sees an empty context. A task reporting an error result
/// stops the run; later tasks are never invoked and nothing is retried.
pub struct TaskPipeline {
    name: String,
    tasks: Vec<Box<dyn Task>>,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
    state: PipelineState,
}

impl TaskPipeline {
    pub fn new(name: impl Into<String>, tasks: Vec<Box<dyn Task>>) -> Self {
        Self {
            name: name.into(),
            tasks,
            progress_handler: None,
            state: PipelineState::Pending,
        }
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Combined option surface of every task, in task order.
    pub fn configuration_options(&self) -> Result<OptionRegistry, OptionError> {
        let registries: Vec<OptionRegistry> =
            self.tasks.iter().map(|t| t.configuration_options()).collect();
        OptionRegistry::merged(&registries)
    }

    pub async fn run(&mut self, configuration: &Configuration) -> Result<TaskContext, PipelineError> {
        let start = Instant::now();
        let total = self.tasks.len();
        info!(pipeline = %self.name, tasks = total, "Running pipeline");
        self.emit(ProgressEvent::Started {
            pipeline: self.name.clone(),
            tasks: total,
        });

        let mut context = TaskContext::default();
        for index in 0..total {
            self.state = PipelineState::Running(index);
            let task = &self.tasks[index];
            let task_name = task.name().to_string();

            debug!(task = %task_name, "Executing task");
            debug!(task = %task_name, context = %context.to_value(), "Context");
            self.emit(ProgressEvent::TaskStarted {
                task: task_name.clone(),
                index,
                total,
            });

            let task_start = Instant::now();
            let outcome = task.execute(configuration, &context).await;
            let failure = match outcome {
                Ok(result) if result.is_success() => {
                    context = context.merge(result.context);
                    self.emit(ProgressEvent::TaskComplete {
                        task: task_name,
                        index,
                        duration: task_start.elapsed(),
                    });
                    continue;
                }
                Ok(result) => PipelineError::TaskFailed {
                    task: task_name.clone(),
                    context: result.context.to_value(),
                },
                Err(source) => {
                    debug!(task = %task_name, error = ?source, "Task failed unexpectedly");
                    PipelineError::Unhandled {
                        task: task_name.clone(),
                        source,
                    }
                }
            };

            self.state = PipelineState::Failed;
            let message = failure.to_string();
            self.emit(ProgressEvent::TaskFailed {
                task: task_name,
                index,
                error: message.clone(),
            });
            self.emit(ProgressEvent::Failed {
                pipeline: self.name.clone(),
                error: message,
            });
            return Err(failure);
        }

        self.state = PipelineState::Succeeded;
        self.emit(ProgressEvent::Completed {
            pipeline: self.name.clone(),
            total_time: start.elapsed(),
        });
        Ok(context)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }
}
