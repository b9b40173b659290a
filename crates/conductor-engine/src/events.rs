//! Engine events and notifiers for observability.
//!
//! Events are emitted as tasks move through the engine so consumers can
//! persist progress, stream it to a UI, or wait for results without polling.

use std::sync::{Arc, Mutex, PoisonError};

use conductor_task::{Operation, TaskId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
  /// A task was accepted and queued.
  TaskSubmitted { task_id: TaskId },

  /// A task left the queue and its pipeline started.
  TaskAdmitted { task_id: TaskId },

  /// A step was recorded.
  StepCompleted {
    task_id: TaskId,
    operation: Operation,
    success: bool,
  },

  /// A pipeline finished and its report was stored.
  TaskFinished { task_id: TaskId, success: bool },

  /// A task was cancelled.
  TaskCancelled { task_id: TaskId },
}

impl EngineEvent {
  pub fn task_id(&self) -> &str {
    match self {
      EngineEvent::TaskSubmitted { task_id }
      | EngineEvent::TaskAdmitted { task_id }
      | EngineEvent::StepCompleted { task_id, .. }
      | EngineEvent::TaskFinished { task_id, .. }
      | EngineEvent::TaskCancelled { task_id } => task_id,
    }
  }
}

/// Receives engine events.
///
/// Implementations must not block; they are called from the scheduling loop
/// and from pipelines.
pub trait EngineNotifier: Send + Sync {
  fn notify(&self, event: EngineEvent);
}

/// A notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl EngineNotifier for NoopNotifier {
  fn notify(&self, _event: EngineEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so a slow consumer never stalls a pipeline. Volume is a handful
  // of events per step.
  sender: mpsc::UnboundedSender<EngineEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<EngineEvent>) -> Self {
    Self { sender }
  }
}

impl EngineNotifier for ChannelNotifier {
  fn notify(&self, event: EngineEvent) {
    // Receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}

/// The configured notifier plus any subscribers added at runtime.
#[derive(Clone)]
pub(crate) struct EventSink {
  notifier: Arc<dyn EngineNotifier>,
  subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<EngineEvent>>>>,
}

impl EventSink {
  pub(crate) fn new(notifier: Arc<dyn EngineNotifier>) -> Self {
    Self {
      notifier,
      subscribers: Arc::new(Mutex::new(Vec::new())),
    }
  }

  pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<EngineEvent> {
    let (sender, receiver) = mpsc::unbounded_channel();
    self
      .subscribers
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(sender);
    receiver
  }

  pub(crate) fn emit(&self, event: EngineEvent) {
    {
      let mut subscribers = self
        .subscribers
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
      subscribers.retain(|s| s.send(event.clone()).is_ok());
    }
    self.notifier.notify(event);
  }
}
