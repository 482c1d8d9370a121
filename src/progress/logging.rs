//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { pipeline, tasks } => {
                info!(pipeline = %pipeline, tasks, "Starting pipeline");
            }
            ProgressEvent::TaskStarted { task, index, total } => {
                info!(
                    task = %task,
                    progress = format!("{}/{}", index + 1, total),
                    "Running task"
                );
            }
            ProgressEvent::TaskComplete {
                task,
                index,
                duration,
            } => {
                debug!(
                    task = %task,
                    index,
                    duration_ms = duration.as_millis(),
                    "Task complete"
                );
            }
            ProgressEvent::TaskFailed { task, index, error } => {
                warn!(task = %task, index, error = %error, "Task failed");
            }
            ProgressEvent::Completed {
                pipeline,
                total_time,
            } => {
                info!(
                    pipeline = %pipeline,
                    total_time_ms = total_time.as_millis(),
                    "Pipeline complete"
                );
            }
            ProgressEvent::Failed { pipeline, error } => {
                warn!(pipeline = %pipeline, error = %error, "Pipeline failed");
            }
        }
    }
}
