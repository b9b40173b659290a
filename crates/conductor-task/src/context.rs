//! Submission context.

use serde::{Deserialize, Serialize};

/// Everything the caller knows about the project when submitting a task.
///
/// The context is owned by its [`Task`](crate::Task) and never changes after
/// submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
  /// Reference to the project location (path or URL).
  pub project: String,
  /// Files the request is expected to touch.
  pub affected_files: Vec<String>,
  /// Relevant source excerpts.
  pub code_context: String,
  /// Free-text requirements.
  pub requirements: String,
  /// Technical constraints (language versions, frameworks, ...).
  pub constraints: Vec<String>,
  pub security_requirements: Vec<SecurityRequirement>,
  pub performance_requirements: Vec<PerformanceRequirement>,
}

impl Context {
  pub fn new(project: impl Into<String>) -> Self {
    Self {
      project: project.into(),
      ..Self::default()
    }
  }

  pub fn with_files<I, S>(mut self, files: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.affected_files = files.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
    self.requirements = requirements.into();
    self
  }

  pub fn with_security(mut self, requirement: SecurityRequirement) -> Self {
    self.security_requirements.push(requirement);
    self
  }

  pub fn with_performance(mut self, requirement: PerformanceRequirement) -> Self {
    self.performance_requirements.push(requirement);
    self
  }
}

/// How strictly a security requirement must be enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
  Basic,
  #[default]
  Standard,
  Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRequirement {
  /// Requirement type, e.g. "authentication" or "input_validation".
  pub kind: String,
  #[serde(default)]
  pub level: SecurityLevel,
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRequirement {
  /// Metric name, e.g. "p99_latency".
  pub metric: String,
  pub target: f64,
  pub unit: String,
}
