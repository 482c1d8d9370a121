//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a task pipeline runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Pipeline started
    Started { pipeline: String, tasks: usize },

    /// Task started
    TaskStarted {
        task: String,
        index: usize,
        total: usize,
    },

    /// Task reported success
    TaskComplete {
        task: String,
        index: usize,
        duration: Duration,
    },

    /// Task reported an error or failed unexpectedly
    TaskFailed {
        task: String,
        index: usize,
        error: String,
    },

    /// Every task succeeded
    Completed {
        pipeline: String,
        total_time: Duration,
    },

    /// Pipeline stopped at a failed task
    Failed { pipeline: String, error: String },
}

/// Trait for handling progress events during a pipeline run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}
