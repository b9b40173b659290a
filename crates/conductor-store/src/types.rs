use conductor_task::{Task, TaskReport, TaskStatus};
use serde::Serialize;

/// Where a task currently lives, with its data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum TaskSnapshot {
  Pending(Task),
  Running(Task),
  Cancelled(Task),
  Finished(TaskReport),
}

impl TaskSnapshot {
  pub fn status(&self) -> TaskStatus {
    match self {
      TaskSnapshot::Pending(task)
      | TaskSnapshot::Running(task)
      | TaskSnapshot::Cancelled(task) => task.status(),
      TaskSnapshot::Finished(report) => report.task.status(),
    }
  }

  pub fn task(&self) -> &Task {
    match self {
      TaskSnapshot::Pending(task)
      | TaskSnapshot::Running(task)
      | TaskSnapshot::Cancelled(task) => task,
      TaskSnapshot::Finished(report) => &report.task,
    }
  }

  pub fn report(&self) -> Option<&TaskReport> {
    match self {
      TaskSnapshot::Finished(report) => Some(report),
      _ => None,
    }
  }
}

/// Number of tasks in each collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
  pub pending: usize,
  pub in_flight: usize,
  pub completed: usize,
  pub cancelled: usize,
}
