use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use conductor_task::{Task, TaskId, TaskReport, TaskStatus};
use tokio_util::sync::CancellationToken;

use crate::types::{StoreStats, TaskSnapshot};

struct InFlight {
  task: Task,
  cancel: CancellationToken,
}

#[derive(Default)]
struct Inner {
  pending: VecDeque<Task>,
  in_flight: HashMap<TaskId, InFlight>,
  completed: HashMap<TaskId, TaskReport>,
  cancelled: HashMap<TaskId, Task>,
}

/// Shared task collections.
#[derive(Default)]
pub struct TaskStore {
  inner: Mutex<Inner>,
}

impl TaskStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Append a task to the back of the pending queue.
  pub fn enqueue(&self, task: Task) {
    self.lock().pending.push_back(task);
  }

  /// Move the oldest pending task to in-flight if fewer than `ceiling` tasks
  /// are in flight.
  ///
  /// The task's cancellation token is a child of `parent`. Returns a copy of
  /// the admitted task and its token.
  pub fn admit_next(
    &self,
    ceiling: usize,
    parent: &CancellationToken,
  ) -> Option<(Task, CancellationToken)> {
    let mut inner = self.lock();
    if inner.in_flight.len() >= ceiling {
      return None;
    }
    let task = inner.pending.pop_front()?;
    let cancel = parent.child_token();
    inner.in_flight.insert(
      task.id.clone(),
      InFlight {
        task: task.clone(),
        cancel: cancel.clone(),
      },
    );
    Some((task, cancel))
  }

  /// Replace the in-flight copy of `task`.
  ///
  /// Returns false when the task is no longer in flight.
  pub fn publish(&self, task: &Task) -> bool {
    match self.lock().in_flight.get_mut(&task.id) {
      Some(entry) => {
        entry.task = task.clone();
        true
      }
      None => false,
    }
  }

  /// Store the report of an in-flight task and remove it from in-flight.
  ///
  /// Returns false, discarding the report, when the task is no longer in
  /// flight (it was cancelled meanwhile).
  pub fn complete(&self, report: TaskReport) -> bool {
    let mut inner = self.lock();
    if inner.in_flight.remove(&report.task.id).is_none() {
      return false;
    }
    inner.completed.insert(report.task.id.clone(), report);
    true
  }

  /// Cancel a pending or in-flight task.
  ///
  /// In-flight tasks are removed immediately and their token fired. Returns
  /// false for unknown and already finished tasks.
  pub fn cancel(&self, task_id: &str) -> bool {
    let mut inner = self.lock();

    if let Some(InFlight { mut task, cancel }) = inner.in_flight.remove(task_id) {
      cancel.cancel();
      let _ = task.advance(TaskStatus::Cancelled);
      inner.cancelled.insert(task.id.clone(), task);
      return true;
    }

    if let Some(pos) = inner.pending.iter().position(|t| t.id == task_id)
      && let Some(mut task) = inner.pending.remove(pos)
    {
      let _ = task.advance(TaskStatus::Cancelled);
      inner.cancelled.insert(task.id.clone(), task);
      return true;
    }

    false
  }

  /// Current snapshot of a task.
  pub fn lookup(&self, task_id: &str) -> Option<TaskSnapshot> {
    let inner = self.lock();
    if let Some(report) = inner.completed.get(task_id) {
      return Some(TaskSnapshot::Finished(report.clone()));
    }
    if let Some(entry) = inner.in_flight.get(task_id) {
      return Some(TaskSnapshot::Running(entry.task.clone()));
    }
    if let Some(task) = inner.cancelled.get(task_id) {
      return Some(TaskSnapshot::Cancelled(task.clone()));
    }
    inner
      .pending
      .iter()
      .find(|t| t.id == task_id)
      .map(|t| TaskSnapshot::Pending(t.clone()))
  }

  /// In-flight tasks, oldest submission first.
  pub fn list_running(&self) -> Vec<Task> {
    let mut tasks: Vec<Task> = self
      .lock()
      .in_flight
      .values()
      .map(|e| e.task.clone())
      .collect();
    tasks.sort_by_key(|t| t.created_at);
    tasks
  }

  /// Pending tasks in queue order.
  pub fn list_pending(&self) -> Vec<Task> {
    self.lock().pending.iter().cloned().collect()
  }

  pub fn in_flight_count(&self) -> usize {
    self.lock().in_flight.len()
  }

  pub fn has_pending(&self) -> bool {
    !self.lock().pending.is_empty()
  }

  /// Whether nothing is queued or running.
  pub fn is_idle(&self) -> bool {
    let inner = self.lock();
    inner.pending.is_empty() && inner.in_flight.is_empty()
  }

  pub fn stats(&self) -> StoreStats {
    let inner = self.lock();
    StoreStats {
      pending: inner.pending.len(),
      in_flight: inner.in_flight.len(),
      completed: inner.completed.len(),
      cancelled: inner.cancelled.len(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use conductor_task::{Assessment, Context, SecurityAnalysis};

  fn task(id: &str) -> Task {
    Task::new(id, id, "do it", Context::default(), Assessment::default())
  }

  fn report(task: Task) -> TaskReport {
    TaskReport {
      success: true,
      task,
      steps: vec![],
      artifacts: vec![],
      test_results: None,
      security: SecurityAnalysis::default(),
      performance: None,
      documentation: vec![],
      errors: vec![],
      recommendations: vec![],
      elapsed_ms: 0,
    }
  }

  #[test]
  fn admits_in_fifo_order() {
    let store = TaskStore::new();
    let root = CancellationToken::new();
    for id in ["a", "b", "c"] {
      store.enqueue(task(id));
    }

    let (first, _) = store.admit_next(3, &root).unwrap();
    let (second, _) = store.admit_next(3, &root).unwrap();
    assert_eq!(first.id, "a");
    assert_eq!(second.id, "b");
    assert_eq!(store.list_pending()[0].id, "c");
  }

  #[test]
  fn admission_respects_ceiling() {
    let store = TaskStore::new();
    let root = CancellationToken::new();
    for id in ["a", "b", "c"] {
      store.enqueue(task(id));
    }

    assert!(store.admit_next(2, &root).is_some());
    assert!(store.admit_next(2, &root).is_some());
    assert!(store.admit_next(2, &root).is_none());
    assert_eq!(store.in_flight_count(), 2);
    assert!(store.has_pending());
  }

  #[test]
  fn complete_moves_report_once() {
    let store = TaskStore::new();
    let root = CancellationToken::new();
    store.enqueue(task("a"));
    let (task, _) = store.admit_next(1, &root).unwrap();

    assert!(store.complete(report(task.clone())));
    assert!(!store.complete(report(task)));

    let snapshot = store.lookup("a").unwrap();
    assert!(snapshot.report().is_some());
    assert!(store.is_idle());
  }

  #[test]
  fn cancel_in_flight_fires_token_and_discards_report() {
    let store = TaskStore::new();
    let root = CancellationToken::new();
    store.enqueue(task("a"));
    let (task, cancel) = store.admit_next(1, &root).unwrap();

    assert!(store.cancel("a"));
    assert!(cancel.is_cancelled());
    assert!(!root.is_cancelled());
    assert!(store.list_running().is_empty());
    assert!(!store.publish(&task));
    assert!(!store.complete(report(task)));

    let snapshot = store.lookup("a").unwrap();
    assert!(matches!(snapshot, TaskSnapshot::Cancelled(_)));
    assert_eq!(snapshot.status(), TaskStatus::Cancelled);
  }

  #[test]
  fn cancel_pending_removes_from_queue() {
    let store = TaskStore::new();
    store.enqueue(task("a"));
    store.enqueue(task("b"));

    assert!(store.cancel("a"));
    assert_eq!(store.list_pending().len(), 1);
    assert_eq!(store.lookup("a").unwrap().status(), TaskStatus::Cancelled);
  }

  #[test]
  fn cancel_unknown_or_finished_is_false() {
    let store = TaskStore::new();
    let root = CancellationToken::new();
    assert!(!store.cancel("missing"));

    store.enqueue(task("a"));
    let (task, _) = store.admit_next(1, &root).unwrap();
    store.complete(report(task));
    assert!(!store.cancel("a"));
    assert!(!store.cancel("a"));
  }

  #[test]
  fn publish_updates_running_copy() {
    let store = TaskStore::new();
    let root = CancellationToken::new();
    store.enqueue(task("a"));
    let (mut task, _) = store.admit_next(1, &root).unwrap();

    task.advance(TaskStatus::Analyzing).unwrap();
    assert!(store.publish(&task));
    assert_eq!(store.list_running()[0].status(), TaskStatus::Analyzing);
    assert_eq!(
      store.stats(),
      StoreStats {
        pending: 0,
        in_flight: 1,
        completed: 0,
        cancelled: 0
      }
    );
  }
}
