//! Execution step records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::phase::{Operation, Phase};

/// Record of one operation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
  pub step_id: String,
  pub phase: Phase,
  pub operation: Operation,
  pub input: serde_json::Value,
  /// Output payload. `Null` when the step failed.
  pub output: serde_json::Value,
  pub duration_ms: u64,
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub started_at: DateTime<Utc>,
}

impl ExecutionStep {
  pub fn succeeded(
    operation: Operation,
    input: serde_json::Value,
    output: serde_json::Value,
    started_at: DateTime<Utc>,
    duration_ms: u64,
  ) -> Self {
    Self {
      step_id: uuid::Uuid::new_v4().to_string(),
      phase: operation.phase(),
      operation,
      input,
      output,
      duration_ms,
      success: true,
      error: None,
      started_at,
    }
  }

  pub fn failed(
    operation: Operation,
    input: serde_json::Value,
    error: impl Into<String>,
    started_at: DateTime<Utc>,
    duration_ms: u64,
  ) -> Self {
    Self {
      step_id: uuid::Uuid::new_v4().to_string(),
      phase: operation.phase(),
      operation,
      input,
      output: serde_json::Value::Null,
      duration_ms,
      success: false,
      error: Some(error.into()),
      started_at,
    }
  }
}

/// Append-only list of steps for one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionLog {
  steps: Vec<ExecutionStep>,
}

impl ExecutionLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a step and return a reference to it.
  pub fn push(&mut self, step: ExecutionStep) -> &ExecutionStep {
    self.steps.push(step);
    &self.steps[self.steps.len() - 1]
  }

  pub fn steps(&self) -> &[ExecutionStep] {
    &self.steps
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn into_steps(self) -> Vec<ExecutionStep> {
    self.steps
  }
}
