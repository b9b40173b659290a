//! Final task reports and the artifacts they aggregate.
//!
//! Everything except [`TaskReport`] and [`AgentError`] is also decoded from
//! phase outputs, so the fields default when a provider omits them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::phase::Phase;
use crate::step::ExecutionStep;
use crate::task::Task;

/// Outcome of a task that reached a terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
  pub success: bool,
  /// Final snapshot of the task.
  pub task: Task,
  pub steps: Vec<ExecutionStep>,
  pub artifacts: Vec<CodeArtifact>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub test_results: Option<TestResults>,
  pub security: SecurityAnalysis,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub performance: Option<PerformanceAnalysis>,
  pub documentation: Vec<Documentation>,
  pub errors: Vec<AgentError>,
  pub recommendations: Vec<String>,
  pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeArtifact {
  pub path: String,
  pub content: String,
  pub language: String,
  /// Estimated test coverage, 0.0-1.0.
  pub test_coverage: f64,
  pub quality: QualityMetrics,
  /// 0.0 (insecure) to 100.0.
  pub security_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityMetrics {
  pub complexity: f64,
  pub maintainability: f64,
  pub readability: f64,
  pub performance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestResults {
  pub total: u32,
  pub passed: u32,
  pub failed: u32,
  pub skipped: u32,
  pub coverage: f64,
  pub cases: Vec<TestCase>,
}

impl TestResults {
  /// Fill the counters from `cases` when the producer only listed cases.
  pub fn normalize(mut self) -> Self {
    if self.total == 0 && !self.cases.is_empty() {
      self.total = self.cases.len() as u32;
      self.passed = self.cases.iter().filter(|c| c.passed).count() as u32;
      self.failed = self.total - self.passed;
    }
    self
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCase {
  pub name: String,
  pub passed: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  #[default]
  Low,
  Medium,
  High,
  Critical,
}

impl Severity {
  /// Risk weight used when aggregating a security risk score.
  pub fn weight(&self) -> f64 {
    match self {
      Severity::Low => 1.0,
      Severity::Medium => 3.0,
      Severity::High => 6.0,
      Severity::Critical => 10.0,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityAnalysis {
  pub vulnerabilities: Vec<Vulnerability>,
  pub compliance: Vec<ComplianceCheck>,
  /// Aggregate risk, 0.0-10.0.
  pub risk_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vulnerability {
  pub kind: String,
  pub severity: Severity,
  pub description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub remediation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceCheck {
  pub standard: String,
  pub passed: bool,
  pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceAnalysis {
  pub metrics: Vec<PerformanceMetric>,
  pub bottlenecks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceMetric {
  pub metric: String,
  pub value: f64,
  pub unit: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
  #[default]
  Design,
  Api,
  Guide,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Documentation {
  pub title: String,
  pub kind: DocKind,
  pub content: String,
}

/// An error recorded against a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentError {
  pub code: String,
  pub message: String,
  pub severity: Severity,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phase: Option<Phase>,
  /// Corrective action for the caller.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub suggestion: Option<String>,
  pub timestamp: DateTime<Utc>,
}

impl AgentError {
  pub fn new(code: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
    Self {
      code: code.into(),
      message: message.into(),
      severity,
      phase: None,
      suggestion: None,
      timestamp: Utc::now(),
    }
  }

  pub fn with_phase(mut self, phase: Phase) -> Self {
    self.phase = Some(phase);
    self
  }

  pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
    self.suggestion = Some(suggestion.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_results_normalize_counts_cases() {
    let results: TestResults = serde_json::from_value(json!({
      "cases": [
        { "name": "a", "passed": true },
        { "name": "b", "passed": false, "message": "assertion failed" }
      ]
    }))
    .unwrap();

    let results = results.normalize();
    assert_eq!(results.total, 2);
    assert_eq!(results.passed, 1);
    assert_eq!(results.failed, 1);
  }

  #[test]
  fn vulnerability_parses_severity() {
    let vuln: Vulnerability = serde_json::from_value(json!({
      "kind": "sql_injection",
      "severity": "critical",
      "description": "raw query"
    }))
    .unwrap();
    assert_eq!(vuln.severity, Severity::Critical);
    assert!(vuln.location.is_none());
  }
}
