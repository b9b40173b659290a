//! Scheduling loop.
//!
//! The loop wakes on a submission, on a pipeline finishing, or on a fallback
//! tick. Each time it admits pending tasks in FIFO order while a concurrency
//! permit is free, and spawns one pipeline per admitted task. It never waits
//! on a pipeline itself.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use conductor_store::{TaskSnapshot, TaskStore};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::error::PipelineError;
use crate::events::{EngineEvent, EventSink};
use crate::pipeline::PipelineController;

/// State shared between the loop, the engine facade and running pipelines.
pub(crate) struct Scheduler {
  store: Arc<TaskStore>,
  pipeline: Arc<PipelineController>,
  events: EventSink,
  permits: Arc<Semaphore>,
  ceiling: usize,
  poll_interval: Duration,
  wake: Arc<Notify>,
  tracker: TaskTracker,
  draining: AtomicBool,
}

impl Scheduler {
  pub(crate) fn new(
    store: Arc<TaskStore>,
    pipeline: Arc<PipelineController>,
    events: EventSink,
    ceiling: usize,
    poll_interval: Duration,
  ) -> Self {
    // A zero ceiling would never admit anything.
    let ceiling = ceiling.max(1);
    Self {
      store,
      pipeline,
      events,
      permits: Arc::new(Semaphore::new(ceiling)),
      ceiling,
      poll_interval,
      wake: Arc::new(Notify::new()),
      tracker: TaskTracker::new(),
      draining: AtomicBool::new(false),
    }
  }

  /// Wake the loop.
  pub(crate) fn wake(&self) {
    self.wake.notify_one();
  }

  /// Ask the loop to exit once the queue and the in-flight set are empty.
  pub(crate) fn drain(&self) {
    self.draining.store(true, Ordering::SeqCst);
    self.wake();
  }

  /// Wait for every spawned pipeline, including cancelled ones still winding
  /// down.
  pub(crate) async fn wait_pipelines(&self) {
    self.tracker.close();
    self.tracker.wait().await;
  }

  /// Run the loop until `cancel` fires or a drain completes.
  pub(crate) async fn run(&self, cancel: CancellationToken) {
    info!(
      max_concurrent = self.ceiling,
      poll_interval_ms = self.poll_interval.as_millis() as u64,
      "scheduler started"
    );

    let mut tick = tokio::time::interval(self.poll_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
      self.admit(&cancel);

      if self.draining.load(Ordering::SeqCst) && self.store.is_idle() {
        info!("scheduler drained");
        break;
      }

      tokio::select! {
        _ = cancel.cancelled() => {
          warn!(
            in_flight = self.store.in_flight_count(),
            "scheduler cancelled"
          );
          break;
        }
        _ = self.wake.notified() => {}
        _ = tick.tick() => {}
      }
    }
  }

  /// Admit pending tasks while permits are free.
  fn admit(&self, cancel: &CancellationToken) {
    loop {
      let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
        return;
      };
      let Some((task, task_cancel)) = self.store.admit_next(self.ceiling, cancel) else {
        return;
      };

      info!(
        task_id = %task.id,
        in_flight = self.store.in_flight_count(),
        "task_admitted"
      );
      self.events.emit(EngineEvent::TaskAdmitted {
        task_id: task.id.clone(),
      });

      let store = Arc::clone(&self.store);
      let pipeline = Arc::clone(&self.pipeline);
      let events = self.events.clone();
      let wake = Arc::clone(&self.wake);

      self.tracker.spawn(async move {
        let task_id = task.id.clone();
        let admitted = task.clone();
        let started = Instant::now();

        // The inner task isolates panics so the permit is always returned.
        let run = tokio::spawn({
          let pipeline = Arc::clone(&pipeline);
          async move { pipeline.run(task, task_cancel).await }
        });
        let report = match run.await {
          Ok(report) => report,
          Err(join_error) => {
            let message = panic_message(join_error);
            error!(task_id = %task_id, error = %message, "pipeline_panicked");
            let task = match store.lookup(&task_id) {
              Some(TaskSnapshot::Running(task)) => task,
              _ => admitted,
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;
            pipeline.crashed(task, PipelineError::Panicked { message }, elapsed_ms)
          }
        };
        let success = report.success;

        if store.complete(report) {
          events.emit(EngineEvent::TaskFinished {
            task_id: task_id.clone(),
            success,
          });
        } else {
          debug!(task_id = %task_id, "discarding report of cancelled task");
        }

        drop(permit);
        wake.notify_one();
      });
    }
  }
}

fn panic_message(err: JoinError) -> String {
  if !err.is_panic() {
    return err.to_string();
  }
  let payload = err.into_panic();
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic".to_string()
  }
}
