//! Task status lifecycle and priority.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a task.
///
/// Transitions move strictly forward through
/// `pending → analyzing → planning → implementing → testing → reviewing`
/// and end in one of the terminal states. `Cancelled` and `Failed` can be
/// reached from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  Pending,
  Analyzing,
  Planning,
  Implementing,
  Testing,
  Reviewing,
  Completed,
  Failed,
  Cancelled,
}

impl TaskStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      TaskStatus::Pending => "pending",
      TaskStatus::Analyzing => "analyzing",
      TaskStatus::Planning => "planning",
      TaskStatus::Implementing => "implementing",
      TaskStatus::Testing => "testing",
      TaskStatus::Reviewing => "reviewing",
      TaskStatus::Completed => "completed",
      TaskStatus::Failed => "failed",
      TaskStatus::Cancelled => "cancelled",
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
    )
  }

  fn rank(&self) -> u8 {
    match self {
      TaskStatus::Pending => 0,
      TaskStatus::Analyzing => 1,
      TaskStatus::Planning => 2,
      TaskStatus::Implementing => 3,
      TaskStatus::Testing => 4,
      TaskStatus::Reviewing => 5,
      TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled => 6,
    }
  }

  /// Whether moving from `self` to `next` is a legal transition.
  pub fn can_transition_to(&self, next: TaskStatus) -> bool {
    if self.is_terminal() {
      return false;
    }
    match next {
      TaskStatus::Failed | TaskStatus::Cancelled => true,
      _ => next.rank() > self.rank(),
    }
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Rejected status change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task '{task_id}' cannot move from {from} to {to}")]
pub struct TransitionError {
  pub task_id: String,
  pub from: TaskStatus,
  pub to: TaskStatus,
}

/// Task priority. Informational only; the scheduler is FIFO.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High,
  Critical,
}

impl Priority {
  pub fn as_str(&self) -> &'static str {
    match self {
      Priority::Low => "low",
      Priority::Medium => "medium",
      Priority::High => "high",
      Priority::Critical => "critical",
    }
  }
}

impl fmt::Display for Priority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn forward_transitions_are_legal() {
    let path = [
      TaskStatus::Pending,
      TaskStatus::Analyzing,
      TaskStatus::Planning,
      TaskStatus::Implementing,
      TaskStatus::Testing,
      TaskStatus::Reviewing,
      TaskStatus::Completed,
    ];
    for pair in path.windows(2) {
      assert!(pair[0].can_transition_to(pair[1]), "{:?}", pair);
    }
  }

  #[test]
  fn backward_transitions_are_rejected() {
    assert!(!TaskStatus::Testing.can_transition_to(TaskStatus::Planning));
    assert!(!TaskStatus::Reviewing.can_transition_to(TaskStatus::Testing));
    assert!(!TaskStatus::Planning.can_transition_to(TaskStatus::Planning));
  }

  #[test]
  fn terminal_states_never_move() {
    for terminal in [
      TaskStatus::Completed,
      TaskStatus::Failed,
      TaskStatus::Cancelled,
    ] {
      assert!(terminal.is_terminal());
      assert!(!terminal.can_transition_to(TaskStatus::Cancelled));
      assert!(!terminal.can_transition_to(TaskStatus::Pending));
    }
  }

  #[test]
  fn cancel_and_fail_from_any_live_state() {
    for live in [
      TaskStatus::Pending,
      TaskStatus::Analyzing,
      TaskStatus::Implementing,
      TaskStatus::Reviewing,
    ] {
      assert!(live.can_transition_to(TaskStatus::Cancelled));
      assert!(live.can_transition_to(TaskStatus::Failed));
    }
  }

  #[test]
  fn priority_orders_by_urgency() {
    assert!(Priority::Critical > Priority::High);
    assert!(Priority::High > Priority::Medium);
    assert!(Priority::Medium > Priority::Low);
    assert_eq!(Priority::default(), Priority::Medium);
  }
}
