//! Pipeline controller.
//!
//! Drives one task through the fixed phase sequence:
//!
//! ```text
//! orchestrator  analyze_project, decompose_task        analyzing, planning
//! architect     design_architecture (design tasks)     planning
//! coder         implement                              implementing
//! reviewer      review_quality, review_security        testing
//! tester        generate_tests, run_tests              testing
//! (report)                                             reviewing
//! ```
//!
//! A failed step is recorded and the next phase receives its `Null` output.
//! Only [`PipelineError`]s abort the run: a failed `implement` step (nothing
//! to review or test), cancellation between phases, or a rejected status
//! change.

use std::sync::Arc;
use std::time::Instant;

use conductor_executor::{PhaseExecutor, PhaseRequest};
use conductor_store::TaskStore;
use conductor_task::{
  AgentError, Capability, CodeArtifact, Documentation, ExecutionLog, Operation,
  PerformanceAnalysis, QualityMetrics, SecurityAnalysis, Severity, Task, TaskReport, TaskStatus,
  TestResults,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::decode;
use crate::error::PipelineError;
use crate::events::{EngineEvent, EventSink};

const MAX_RISK: f64 = 10.0;

/// Everything a run accumulates on its way to a report.
struct Run {
  task: Task,
  log: ExecutionLog,
  artifacts: Vec<CodeArtifact>,
  tests: Vec<CodeArtifact>,
  quality: Option<QualityMetrics>,
  test_results: Option<TestResults>,
  security: SecurityAnalysis,
  performance: Option<PerformanceAnalysis>,
  documentation: Vec<Documentation>,
  errors: Vec<AgentError>,
  recommendations: Vec<String>,
}

impl Run {
  fn new(task: Task) -> Self {
    Self {
      task,
      log: ExecutionLog::new(),
      artifacts: Vec::new(),
      tests: Vec::new(),
      quality: None,
      test_results: None,
      security: SecurityAnalysis::default(),
      performance: None,
      documentation: Vec::new(),
      errors: Vec::new(),
      recommendations: Vec::new(),
    }
  }

  fn into_report(self, success: bool, elapsed_ms: u64) -> TaskReport {
    TaskReport {
      success,
      task: self.task,
      steps: self.log.into_steps(),
      artifacts: self.artifacts,
      test_results: self.test_results,
      security: self.security,
      performance: self.performance,
      documentation: self.documentation,
      errors: self.errors,
      recommendations: self.recommendations,
      elapsed_ms,
    }
  }

  fn recommend(&mut self, items: impl IntoIterator<Item = String>) {
    for item in items {
      if !self.recommendations.contains(&item) {
        self.recommendations.push(item);
      }
    }
  }
}

/// Runs task pipelines.
pub struct PipelineController {
  executor: Arc<PhaseExecutor>,
  store: Arc<TaskStore>,
  events: EventSink,
}

impl PipelineController {
  pub(crate) fn new(executor: Arc<PhaseExecutor>, store: Arc<TaskStore>, events: EventSink) -> Self {
    Self {
      executor,
      store,
      events,
    }
  }

  /// Number of steps a pipeline for `task` records.
  pub fn total_steps(task: &Task) -> usize {
    if task.requires(Capability::Design) { 8 } else { 7 }
  }

  /// Run `task` to a terminal status and build its report.
  ///
  /// Never fails: task-level errors produce a report with `success = false`
  /// that keeps every step and artifact produced so far.
  #[instrument(
    name = "pipeline_run",
    skip(self, task, cancel),
    fields(task_id = %task.id)
  )]
  pub async fn run(&self, task: Task, cancel: CancellationToken) -> TaskReport {
    let started = Instant::now();
    let mut run = Run::new(task);

    info!(
      task_id = %run.task.id,
      priority = %run.task.priority,
      complexity = run.task.complexity,
      "task_started"
    );

    let outcome = self.drive(&mut run, &cancel).await;

    let success = match outcome {
      Ok(()) => match run.task.advance(TaskStatus::Completed) {
        Ok(()) => true,
        Err(e) => {
          self.abort(&mut run, PipelineError::from(e));
          false
        }
      },
      Err(e) => {
        self.abort(&mut run, e);
        false
      }
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    if success {
      info!(
        task_id = %run.task.id,
        steps = run.log.len(),
        artifacts = run.artifacts.len(),
        elapsed_ms,
        "task_completed"
      );
    }

    run.into_report(success, elapsed_ms)
  }

  /// Failed report for a pipeline that died without producing one.
  ///
  /// `task` is the last published snapshot; the steps recorded by the dead
  /// run are lost.
  pub(crate) fn crashed(&self, task: Task, err: PipelineError, elapsed_ms: u64) -> TaskReport {
    let mut run = Run::new(task);
    self.abort(&mut run, err);
    run.into_report(false, elapsed_ms)
  }

  async fn drive(&self, run: &mut Run, cancel: &CancellationToken) -> Result<(), PipelineError> {
    run.task.plan_steps(Self::total_steps(&run.task));

    // Orchestrator
    self.enter(run, TaskStatus::Analyzing)?;
    let request = PhaseRequest::AnalyzeProject {
      description: run.task.description.clone(),
      context: run.task.context().clone(),
    };
    let analysis = self.step(run, request, cancel).await;
    checkpoint(cancel)?;

    self.enter(run, TaskStatus::Planning)?;
    let request = PhaseRequest::DecomposeTask {
      analysis,
      description: run.task.description.clone(),
    };
    let plan = self.step(run, request, cancel).await;
    run.recommend(decode::recommendations(&plan));
    checkpoint(cancel)?;

    // Architect
    let design = if run.task.requires(Capability::Design) {
      let request = PhaseRequest::DesignArchitecture {
        plan: plan.clone(),
        requirements: run.task.context().requirements.clone(),
      };
      let design = self.step(run, request, cancel).await;
      run.documentation.extend(decode::design_document(&design));
      checkpoint(cancel)?;
      design
    } else {
      Value::Null
    };

    // Coder
    self.enter(run, TaskStatus::Implementing)?;
    let request = PhaseRequest::Implement {
      plan,
      context: run.task.context().clone(),
      design,
    };
    let implementation = self.step(run, request, cancel).await;
    checkpoint(cancel)?;
    if let Some(reason) = self.last_failure(run) {
      return Err(PipelineError::MissingOutput {
        operation: Operation::Implement,
        reason,
      });
    }
    run.artifacts = decode::artifacts(&implementation, "implementation.txt");

    // Reviewer
    self.enter(run, TaskStatus::Testing)?;
    let request = PhaseRequest::ReviewQuality {
      code: run.artifacts.clone(),
    };
    let review = decode::quality_review(&self.step(run, request, cancel).await);
    run.quality = review.quality;
    run.performance = review.performance;
    run.recommend(review.recommendations);
    checkpoint(cancel)?;

    let request = PhaseRequest::ReviewSecurity {
      code: run.artifacts.clone(),
      security_requirements: run.task.context().security_requirements.clone(),
    };
    let review = decode::security_review(&self.step(run, request, cancel).await);
    run.security.vulnerabilities = review.vulnerabilities;
    run.security.compliance = review.compliance;
    run.recommend(review.recommendations);
    checkpoint(cancel)?;

    // Tester
    let request = PhaseRequest::GenerateTests {
      code: run.artifacts.clone(),
    };
    let generated = self.step(run, request, cancel).await;
    run.tests = decode::artifacts(&generated, "tests.txt");
    checkpoint(cancel)?;

    let request = PhaseRequest::RunTests {
      tests: run.tests.clone(),
    };
    run.test_results = decode::test_results(&self.step(run, request, cancel).await);
    checkpoint(cancel)?;

    // Report assembly
    self.enter(run, TaskStatus::Reviewing)?;
    assemble(run);
    Ok(())
  }

  /// Execute one operation, record it and return its output (`Null` on
  /// failure).
  async fn step(&self, run: &mut Run, request: PhaseRequest, cancel: &CancellationToken) -> Value {
    let operation = request.operation();
    run.task.begin_step(operation);
    self.store.publish(&run.task);

    let step = self.executor.execute(&run.task.id, request, cancel).await;
    let success = step.success;
    let output = step.output.clone();

    if let Some(message) = &step.error {
      run.errors.push(
        AgentError::new("STEP_FAILED", format!("{}: {}", operation, message), Severity::Medium)
          .with_phase(operation.phase()),
      );
    }

    run.log.push(step);
    run.task.finish_step();
    self.store.publish(&run.task);

    self.events.emit(EngineEvent::StepCompleted {
      task_id: run.task.id.clone(),
      operation,
      success,
    });

    output
  }

  fn enter(&self, run: &mut Run, status: TaskStatus) -> Result<(), PipelineError> {
    run.task.advance(status)?;
    self.store.publish(&run.task);
    Ok(())
  }

  fn last_failure(&self, run: &Run) -> Option<String> {
    run
      .log
      .steps()
      .last()
      .filter(|s| !s.success)
      .map(|s| s.error.clone().unwrap_or_default())
  }

  fn abort(&self, run: &mut Run, err: PipelineError) {
    error!(
      task_id = %run.task.id,
      code = err.code(),
      error = %err,
      "task_failed"
    );

    let mut agent_error =
      AgentError::new(err.code(), err.to_string(), Severity::Critical).with_suggestion(err.suggestion());
    if let Some(phase) = run.task.progress().phase {
      agent_error = agent_error.with_phase(phase);
    }
    run.errors.push(agent_error);

    let _ = run.task.advance(TaskStatus::Failed);
  }
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), PipelineError> {
  if cancel.is_cancelled() {
    return Err(PipelineError::Cancelled);
  }
  Ok(())
}

/// Fold review and test findings into the artifacts and recommendations.
fn assemble(run: &mut Run) {
  let risk: f64 = run
    .security
    .vulnerabilities
    .iter()
    .map(|v| v.severity.weight())
    .sum();
  run.security.risk_score = risk.min(MAX_RISK);
  let security_score = (100.0 - run.security.risk_score * 10.0).clamp(0.0, 100.0);

  let coverage = run.test_results.as_ref().map(|r| r.coverage).unwrap_or(0.0);

  for artifact in &mut run.artifacts {
    if artifact.security_score == 0.0 {
      artifact.security_score = security_score;
    }
    if artifact.test_coverage == 0.0 {
      artifact.test_coverage = coverage;
    }
    if artifact.quality == QualityMetrics::default()
      && let Some(quality) = &run.quality
    {
      artifact.quality = quality.clone();
    }
  }

  let mut derived = Vec::new();
  for vuln in &run.security.vulnerabilities {
    if vuln.severity >= Severity::High {
      derived.push(match &vuln.remediation {
        Some(fix) => format!("Fix {} vulnerability: {}", vuln.kind, fix),
        None => format!("Fix {} vulnerability: {}", vuln.kind, vuln.description),
      });
    }
  }
  for check in run.security.compliance.iter().filter(|c| !c.passed) {
    derived.push(format!("Address {} compliance failure", check.standard));
  }
  if let Some(results) = &run.test_results
    && results.failed > 0
  {
    derived.push(format!("Fix {} failing test(s)", results.failed));
  }
  if run.test_results.is_none() {
    derived.push("Run the generated tests manually; no results were reported".to_string());
  }
  for step in run.log.steps().iter().filter(|s| !s.success) {
    derived.push(format!("Re-run {} once its failure is resolved", step.operation.label()));
  }
  run.recommend(derived);
}
