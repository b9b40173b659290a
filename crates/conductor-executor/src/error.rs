//! Error types for step execution.

use conductor_capability::ToolError;
use conductor_provider::ProviderError;
use conductor_task::Phase;
use thiserror::Error;

/// Reasons a step can fail. Recorded on the step, never returned.
#[derive(Debug, Error)]
pub enum StepError {
  /// No completion provider is active.
  #[error("no provider available")]
  NoProvider,

  /// The directive template failed to render.
  #[error("failed to render directive for phase '{phase}': {message}")]
  Directive { phase: Phase, message: String },

  /// A matched tool failed.
  #[error("tool '{server}/{tool}' failed: {source}")]
  Tool {
    server: String,
    tool: String,
    #[source]
    source: ToolError,
  },

  /// The provider call failed.
  #[error("provider '{provider}' failed: {source}")]
  Provider {
    provider: String,
    #[source]
    source: ProviderError,
  },

  /// The step ran past its deadline.
  #[error("step timed out after {timeout_ms}ms")]
  Timeout { timeout_ms: u64 },

  /// The task was cancelled while the step ran.
  #[error("step cancelled")]
  Cancelled,
}
