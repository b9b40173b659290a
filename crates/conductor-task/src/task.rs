//! The live task record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::intake::Assessment;
use crate::phase::{Capability, Operation, Phase};
use crate::status::{Priority, TaskStatus, TransitionError};

/// Unique task identifier.
pub type TaskId = String;

/// Snapshot of a task's position in its pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
  /// Phase currently (or last) executing.
  pub phase: Option<Phase>,
  /// Operation currently (or last) executing.
  pub operation: Option<Operation>,
  pub steps_completed: usize,
  pub total_steps: usize,
  /// Completion percentage, 0-100.
  pub percent: u8,
}

impl Progress {
  fn recompute_percent(&mut self) {
    self.percent = if self.total_steps == 0 {
      0
    } else {
      let ratio = self.steps_completed.min(self.total_steps) * 100 / self.total_steps;
      ratio as u8
    };
  }
}

/// A submitted engineering request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
  pub id: TaskId,
  pub title: String,
  pub description: String,
  pub priority: Priority,
  /// Complexity score, 1-5.
  pub complexity: u8,
  pub required_capabilities: BTreeSet<Capability>,
  pub dependencies: Vec<TaskId>,
  context: Context,
  status: TaskStatus,
  progress: Progress,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Task {
  /// Create a pending task from an intake assessment.
  pub fn new(
    id: impl Into<TaskId>,
    title: impl Into<String>,
    description: impl Into<String>,
    context: Context,
    assessment: Assessment,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: id.into(),
      title: title.into(),
      description: description.into(),
      priority: assessment.priority,
      complexity: assessment.complexity,
      required_capabilities: assessment.capabilities,
      dependencies: Vec::new(),
      context,
      status: TaskStatus::Pending,
      progress: Progress::default(),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn with_dependencies(mut self, dependencies: Vec<TaskId>) -> Self {
    self.dependencies = dependencies;
    self
  }

  pub fn context(&self) -> &Context {
    &self.context
  }

  pub fn status(&self) -> TaskStatus {
    self.status
  }

  pub fn progress(&self) -> &Progress {
    &self.progress
  }

  pub fn requires(&self, capability: Capability) -> bool {
    self.required_capabilities.contains(&capability)
  }

  /// Move the task to `next`.
  ///
  /// Requesting the current status again is a no-op.
  pub fn advance(&mut self, next: TaskStatus) -> Result<(), TransitionError> {
    if self.status == next && !next.is_terminal() {
      return Ok(());
    }
    if !self.status.can_transition_to(next) {
      return Err(TransitionError {
        task_id: self.id.clone(),
        from: self.status,
        to: next,
      });
    }
    self.status = next;
    self.touch();
    Ok(())
  }

  /// Fix the number of steps the pipeline will record.
  pub fn plan_steps(&mut self, total_steps: usize) {
    self.progress.total_steps = total_steps;
    self.progress.recompute_percent();
    self.touch();
  }

  /// Record that `operation` has started.
  pub fn begin_step(&mut self, operation: Operation) {
    self.progress.phase = Some(operation.phase());
    self.progress.operation = Some(operation);
    self.touch();
  }

  /// Record that the current step has been written to the log.
  pub fn finish_step(&mut self) {
    self.progress.steps_completed += 1;
    self.progress.recompute_percent();
    self.touch();
  }

  fn touch(&mut self) {
    self.updated_at = Utc::now();
  }
}
