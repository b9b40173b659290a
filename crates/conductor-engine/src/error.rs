//! Error types for the engine.

use conductor_provider::ProviderError;
use conductor_task::{Operation, TransitionError};
use thiserror::Error;

/// Rejected submissions. A rejected task is never enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
  #[error("task description is empty")]
  EmptyDescription,

  #[error("engine is shutting down")]
  ShuttingDown,
}

/// Errors that abort a task's pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// A step whose output later phases depend on produced nothing.
  #[error("{operation} produced no output: {reason}")]
  MissingOutput { operation: Operation, reason: String },

  /// The task was cancelled.
  #[error("task cancelled")]
  Cancelled,

  /// A status change was rejected.
  #[error(transparent)]
  InvalidTransition(#[from] TransitionError),

  /// The pipeline panicked.
  #[error("pipeline panicked: {message}")]
  Panicked { message: String },
}

impl PipelineError {
  /// Stable code recorded on the task's error list.
  pub fn code(&self) -> &'static str {
    match self {
      PipelineError::MissingOutput { .. } => "MISSING_OUTPUT",
      PipelineError::Cancelled => "CANCELLED",
      PipelineError::InvalidTransition(_) => "INVALID_TRANSITION",
      PipelineError::Panicked { .. } => "PIPELINE_PANICKED",
    }
  }

  /// What the caller can do about it.
  pub fn suggestion(&self) -> &'static str {
    match self {
      PipelineError::MissingOutput { .. } => {
        "Check that a completion provider is configured and reachable, then resubmit the task"
      }
      PipelineError::Cancelled => "Resubmit the task if the work is still needed",
      PipelineError::InvalidTransition(_) => "Resubmit the task; report the issue if it persists",
      PipelineError::Panicked { .. } => {
        "Check the tools and provider used by the failing phase, then resubmit the task"
      }
    }
  }
}

/// Engine lifecycle errors.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("engine is already running")]
  AlreadyRunning,

  #[error("failed to configure provider: {0}")]
  Provider(#[from] ProviderError),
}
