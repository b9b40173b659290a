//! Phase executor implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use conductor_capability::{CallerContext, ToolRegistry};
use conductor_config::ExecutorConfig;
use conductor_provider::{CompletionProvider, Directive, ProviderRegistry};
use conductor_task::{ExecutionStep, Phase};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::directive::DirectiveBuilder;
use crate::error::StepError;
use crate::output::{normalize_tool_output, parse_output};
use crate::request::PhaseRequest;
use crate::tools::find_tool;

/// Executes single pipeline operations.
pub struct PhaseExecutor {
  providers: ProviderRegistry,
  tools: Option<Arc<dyn ToolRegistry>>,
  caller: CallerContext,
  directives: DirectiveBuilder,
  step_timeout: Option<Duration>,
}

impl PhaseExecutor {
  /// Create an executor with the default caller identity and templates.
  pub fn new(providers: ProviderRegistry) -> Self {
    Self::from_config(providers, &ExecutorConfig::default())
  }

  pub fn from_config(providers: ProviderRegistry, config: &ExecutorConfig) -> Self {
    let caller = config.caller.permissions.iter().fold(
      CallerContext::new(&config.caller.id, &config.caller.role),
      |caller, permission| caller.with_permission(permission),
    );

    Self {
      providers,
      tools: None,
      caller,
      directives: DirectiveBuilder::with_overrides(config.templates.clone()),
      step_timeout: config.step_timeout(),
    }
  }

  pub fn with_tools(mut self, tools: Arc<dyn ToolRegistry>) -> Self {
    self.tools = Some(tools);
    self
  }

  pub fn with_template(mut self, phase: Phase, template: impl Into<String>) -> Self {
    self.directives.set_template(phase, template);
    self
  }

  pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
    self.step_timeout = Some(timeout);
    self
  }

  /// Execute one operation for `task_id`.
  ///
  /// Always returns a step. Failures are recorded with `success = false` and
  /// a `Null` output.
  #[instrument(
    name = "step_execute",
    skip(self, task_id, request, cancel),
    fields(
      task_id = %task_id,
      operation = %request.operation(),
    )
  )]
  pub async fn execute(
    &self,
    task_id: &str,
    request: PhaseRequest,
    cancel: &CancellationToken,
  ) -> ExecutionStep {
    let operation = request.operation();
    let input = request.to_input();
    let started_at = Utc::now();
    let clock = Instant::now();

    let result = tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(StepError::Cancelled),
      result = self.run_with_deadline(task_id, &request, &input) => result,
    };

    let duration_ms = clock.elapsed().as_millis() as u64;

    match result {
      Ok(output) => {
        info!(
          task_id = %task_id,
          operation = %operation,
          duration_ms,
          "step_completed"
        );
        ExecutionStep::succeeded(operation, input, output, started_at, duration_ms)
      }
      Err(e) => {
        warn!(
          task_id = %task_id,
          operation = %operation,
          duration_ms,
          error = %e,
          "step_failed"
        );
        ExecutionStep::failed(operation, input, e.to_string(), started_at, duration_ms)
      }
    }
  }

  async fn run_with_deadline(
    &self,
    task_id: &str,
    request: &PhaseRequest,
    input: &serde_json::Value,
  ) -> Result<serde_json::Value, StepError> {
    let run = self.run(task_id, request, input);
    match self.step_timeout {
      Some(timeout) => tokio::time::timeout(timeout, run)
        .await
        .unwrap_or(Err(StepError::Timeout {
          timeout_ms: timeout.as_millis() as u64,
        })),
      None => run.await,
    }
  }

  async fn run(
    &self,
    task_id: &str,
    request: &PhaseRequest,
    input: &serde_json::Value,
  ) -> Result<serde_json::Value, StepError> {
    let provider = self.providers.active().ok_or(StepError::NoProvider)?;
    let directive = self.directives.build(task_id, request)?;
    let caller = self.caller.for_session(task_id);

    if let Some(output) = self.try_tool(&directive, input, &caller).await {
      return output;
    }

    self.complete(provider, &directive).await
  }

  /// Invoke a matching tool, if the registry offers one.
  async fn try_tool(
    &self,
    directive: &Directive,
    input: &serde_json::Value,
    caller: &CallerContext,
  ) -> Option<Result<serde_json::Value, StepError>> {
    let tools = self.tools.as_ref()?;

    let descriptors = match tools.list_capabilities(caller).await {
      Ok(descriptors) => descriptors,
      Err(e) => {
        warn!(error = %e, "failed to list tool capabilities, falling back to provider");
        return None;
      }
    };

    let tool = find_tool(&descriptors, directive.operation)?;
    info!(
      operation = %directive.operation,
      server = %tool.server,
      tool = %tool.name,
      "dispatching step to tool"
    );

    let result = tools
      .invoke(&tool.server, &tool.name, input.clone(), caller)
      .await
      .map(normalize_tool_output)
      .map_err(|source| StepError::Tool {
        server: tool.server.clone(),
        tool: tool.name.clone(),
        source,
      });
    Some(result)
  }

  async fn complete(
    &self,
    provider: Arc<dyn CompletionProvider>,
    directive: &Directive,
  ) -> Result<serde_json::Value, StepError> {
    let text = provider
      .complete(directive)
      .await
      .map_err(|source| StepError::Provider {
        provider: provider.name().to_string(),
        source,
      })?;
    Ok(parse_output(&text))
  }
}
