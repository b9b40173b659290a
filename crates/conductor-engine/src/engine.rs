//! Engine facade: submission, query and control.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use conductor_capability::ToolRegistry;
use conductor_config::{EngineConfig, ProviderKind};
use conductor_executor::PhaseExecutor;
use conductor_provider::{HttpProvider, ProviderRegistry, StaticProvider};
use conductor_store::{StoreStats, TaskSnapshot, TaskStore};
use conductor_task::{Context, Priority, Task, TaskId, intake};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::error::{EngineError, SubmitError};
use crate::events::{EngineEvent, EngineNotifier, EventSink, NoopNotifier};
use crate::pipeline::PipelineController;
use crate::scheduler::Scheduler;

/// A submission with optional overrides of the derived fields.
#[derive(Debug, Clone, Default)]
pub struct TaskRequest {
  pub description: String,
  pub context: Context,
  /// Replaces the title derived from the description.
  pub title: Option<String>,
  /// Replaces the priority derived from the description.
  pub priority: Option<Priority>,
  pub dependencies: Vec<TaskId>,
}

impl TaskRequest {
  pub fn new(description: impl Into<String>, context: Context) -> Self {
    Self {
      description: description.into(),
      context,
      ..Self::default()
    }
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = Some(title.into());
    self
  }

  pub fn with_priority(mut self, priority: Priority) -> Self {
    self.priority = Some(priority);
    self
  }

  pub fn with_dependencies(mut self, dependencies: Vec<TaskId>) -> Self {
    self.dependencies = dependencies;
    self
  }
}

/// The task orchestration engine.
///
/// # Usage
///
/// ```ignore
/// let engine = Arc::new(Engine::new(&config, executor));
///
/// let cancel = CancellationToken::new();
/// let runner = tokio::spawn({
///   let engine = engine.clone();
///   async move { engine.start(cancel).await }
/// });
///
/// let id = engine.submit("Add a health endpoint", Context::default())?;
/// // poll engine.get_status(&id) or engine.subscribe()
///
/// engine.shutdown().await;
/// ```
pub struct Engine {
  store: Arc<TaskStore>,
  scheduler: Scheduler,
  events: EventSink,
  accepting: AtomicBool,
  started: AtomicBool,
  stopped: CancellationToken,
}

impl Engine {
  /// Create an engine that runs steps on `executor`.
  pub fn new(config: &EngineConfig, executor: PhaseExecutor) -> Self {
    Self::with_notifier(config, executor, Arc::new(NoopNotifier))
  }

  /// Create an engine that reports events to `notifier`.
  pub fn with_notifier(
    config: &EngineConfig,
    executor: PhaseExecutor,
    notifier: Arc<dyn EngineNotifier>,
  ) -> Self {
    let store = Arc::new(TaskStore::new());
    let events = EventSink::new(notifier);
    let pipeline = Arc::new(PipelineController::new(
      Arc::new(executor),
      Arc::clone(&store),
      events.clone(),
    ));
    let scheduler = Scheduler::new(
      Arc::clone(&store),
      pipeline,
      events.clone(),
      config.scheduler.max_concurrent,
      config.scheduler.poll_interval(),
    );

    Self {
      store,
      scheduler,
      events,
      accepting: AtomicBool::new(true),
      started: AtomicBool::new(false),
      stopped: CancellationToken::new(),
    }
  }

  /// Build an engine and its provider from configuration alone.
  pub fn from_config(
    config: &EngineConfig,
    tools: Option<Arc<dyn ToolRegistry>>,
  ) -> Result<Self, EngineError> {
    let providers = providers_from_config(config)?;
    let mut executor = PhaseExecutor::from_config(providers, &config.executor);
    if let Some(tools) = tools {
      executor = executor.with_tools(tools);
    }
    Ok(Self::new(config, executor))
  }

  /// Submit a task described in free text.
  pub fn submit(&self, description: &str, context: Context) -> Result<TaskId, SubmitError> {
    self.submit_request(TaskRequest::new(description, context))
  }

  /// Submit a task with optional overrides.
  #[instrument(name = "task_submit", skip(self, request))]
  pub fn submit_request(&self, request: TaskRequest) -> Result<TaskId, SubmitError> {
    if !self.accepting.load(Ordering::SeqCst) {
      return Err(SubmitError::ShuttingDown);
    }
    if request.description.trim().is_empty() {
      return Err(SubmitError::EmptyDescription);
    }

    let mut assessment = intake::assess(&request.description, &request.context);
    if let Some(priority) = request.priority {
      assessment.priority = priority;
    }
    let title = request
      .title
      .unwrap_or_else(|| intake::derive_title(&request.description));

    let id = uuid::Uuid::new_v4().to_string();
    let task = Task::new(
      id.clone(),
      title,
      request.description,
      request.context,
      assessment,
    )
    .with_dependencies(request.dependencies);

    info!(
      task_id = %id,
      title = %task.title,
      priority = %task.priority,
      complexity = task.complexity,
      capabilities = ?task.required_capabilities,
      "task_submitted"
    );

    self.store.enqueue(task);
    self.events.emit(EngineEvent::TaskSubmitted {
      task_id: id.clone(),
    });
    self.scheduler.wake();
    Ok(id)
  }

  /// Current state of a task, or `None` if the id is unknown.
  pub fn get_status(&self, task_id: &str) -> Option<TaskSnapshot> {
    self.store.lookup(task_id)
  }

  /// Tasks whose pipelines are running.
  pub fn list_running(&self) -> Vec<Task> {
    self.store.list_running()
  }

  /// Tasks waiting for a slot, oldest first.
  pub fn list_pending(&self) -> Vec<Task> {
    self.store.list_pending()
  }

  pub fn stats(&self) -> StoreStats {
    self.store.stats()
  }

  /// Cancel a pending or running task.
  ///
  /// Returns false if the task is unknown or already finished.
  pub fn cancel(&self, task_id: &str) -> bool {
    if !self.store.cancel(task_id) {
      return false;
    }
    info!(task_id = %task_id, "task_cancelled");
    self.events.emit(EngineEvent::TaskCancelled {
      task_id: task_id.to_string(),
    });
    self.scheduler.wake();
    true
  }

  /// Receive every event emitted from now on.
  pub fn subscribe(&self) -> mpsc::UnboundedReceiver<EngineEvent> {
    self.events.subscribe()
  }

  /// Run the scheduling loop until `cancel` fires or [`shutdown`](Self::shutdown)
  /// completes.
  pub async fn start(&self, cancel: CancellationToken) -> Result<(), EngineError> {
    if self.started.swap(true, Ordering::SeqCst) {
      return Err(EngineError::AlreadyRunning);
    }

    self.scheduler.run(cancel).await;
    self.stopped.cancel();
    Ok(())
  }

  /// Stop accepting submissions, finish every queued and running task, then
  /// stop the loop.
  ///
  /// If the loop was never started, it runs here until the queue is empty.
  pub async fn shutdown(&self) {
    self.accepting.store(false, Ordering::SeqCst);
    info!(pending = self.store.stats().pending, "engine shutting down");

    self.scheduler.drain();
    if self.started.swap(true, Ordering::SeqCst) {
      self.stopped.cancelled().await;
    } else {
      // Never started: run the loop here so queued tasks still finish.
      self.scheduler.run(CancellationToken::new()).await;
      self.stopped.cancel();
    }
    self.scheduler.wait_pipelines().await;
    info!("engine stopped");
  }
}

/// Build the provider registry described by `config.provider`.
pub fn providers_from_config(config: &EngineConfig) -> Result<ProviderRegistry, EngineError> {
  let registry = ProviderRegistry::new();
  let provider = &config.provider;

  match provider.kind {
    ProviderKind::Http => {
      let mut http = HttpProvider::new(
        provider.base_url.clone(),
        provider.model.clone(),
        provider.api_key.clone(),
      )?;
      if let Some(max_tokens) = provider.max_tokens {
        http = http.with_max_tokens(max_tokens);
      }
      registry.register(Arc::new(http));
    }
    ProviderKind::Static => {
      registry.register(Arc::new(StaticProvider::new(
        provider.static_response.clone(),
      )));
    }
    ProviderKind::None => {}
  }

  Ok(registry)
}
