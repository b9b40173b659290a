//! Lenient decoding of phase outputs.
//!
//! Providers answer in loosely structured JSON. Everything here accepts a
//! missing or malformed field by falling back to an empty value, so a sloppy
//! answer degrades the report instead of failing the task.

use conductor_task::{
  CodeArtifact, ComplianceCheck, DocKind, Documentation, PerformanceAnalysis, QualityMetrics,
  TestResults, Vulnerability,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

fn list<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
  value
    .and_then(Value::as_array)
    .map(|items| {
      items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
    })
    .unwrap_or_default()
}

fn object<T: DeserializeOwned>(value: Option<&Value>) -> Option<T> {
  value
    .filter(|v| v.is_object())
    .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn text(output: &Value) -> Option<&str> {
  output
    .get("text")
    .and_then(Value::as_str)
    .filter(|t| !t.trim().is_empty())
}

/// String recommendations listed under `recommendations`.
pub(crate) fn recommendations(output: &Value) -> Vec<String> {
  list(output.get("recommendations"))
}

/// Code files from a `files` (or `artifacts`) array.
///
/// A plain text answer becomes a single artifact at `fallback_path`.
pub(crate) fn artifacts(output: &Value, fallback_path: &str) -> Vec<CodeArtifact> {
  let files = output.get("files").or_else(|| output.get("artifacts"));
  if files.is_some_and(Value::is_array) {
    return list::<CodeArtifact>(files)
      .into_iter()
      .filter(|a| !a.path.is_empty() || !a.content.is_empty())
      .collect();
  }

  match text(output) {
    Some(content) => vec![CodeArtifact {
      path: fallback_path.to_string(),
      content: content.to_string(),
      language: "text".to_string(),
      ..CodeArtifact::default()
    }],
    None => Vec::new(),
  }
}

/// Design documentation from the architect's answer.
pub(crate) fn design_document(output: &Value) -> Option<Documentation> {
  if output.is_null() {
    return None;
  }

  let title = output
    .get("title")
    .and_then(Value::as_str)
    .unwrap_or("Architecture design")
    .to_string();
  let content = output
    .get("content")
    .and_then(Value::as_str)
    .or_else(|| text(output))
    .map(str::to_string)
    .unwrap_or_else(|| serde_json::to_string_pretty(output).unwrap_or_default());

  Some(Documentation {
    title,
    kind: DocKind::Design,
    content,
  })
}

/// Findings of the quality review.
#[derive(Debug, Default)]
pub(crate) struct QualityReview {
  pub quality: Option<QualityMetrics>,
  pub performance: Option<PerformanceAnalysis>,
  pub recommendations: Vec<String>,
}

pub(crate) fn quality_review(output: &Value) -> QualityReview {
  QualityReview {
    quality: object(output.get("quality")),
    performance: object(output.get("performance")),
    recommendations: recommendations(output),
  }
}

/// Findings of the security review.
#[derive(Debug, Default)]
pub(crate) struct SecurityReview {
  pub vulnerabilities: Vec<Vulnerability>,
  pub compliance: Vec<ComplianceCheck>,
  pub recommendations: Vec<String>,
}

pub(crate) fn security_review(output: &Value) -> SecurityReview {
  SecurityReview {
    vulnerabilities: list(output.get("vulnerabilities")),
    compliance: list(output.get("compliance")),
    recommendations: recommendations(output),
  }
}

/// Test results, either at the top level or under `results`.
pub(crate) fn test_results(output: &Value) -> Option<TestResults> {
  let candidate = output.get("results").unwrap_or(output);
  let has_counts = ["total", "passed", "failed", "cases"]
    .iter()
    .any(|key| candidate.get(key).is_some());
  if !has_counts {
    return None;
  }
  object::<TestResults>(Some(candidate)).map(TestResults::normalize)
}

#[cfg(test)]
mod tests {
  use super::*;
  use conductor_task::Severity;
  use serde_json::json;

  #[test]
  fn artifacts_from_files_array() {
    let output = json!({
      "files": [
        { "path": "src/api.rs", "content": "fn main() {}", "language": "rust" },
        { "bogus": true },
        "not an object"
      ]
    });
    let artifacts = artifacts(&output, "implementation.txt");
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].path, "src/api.rs");
    assert_eq!(artifacts[0].language, "rust");
  }

  #[test]
  fn plain_text_becomes_single_artifact() {
    let artifacts = artifacts(&json!({"text": "print('hi')"}), "implementation.txt");
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].path, "implementation.txt");
    assert_eq!(artifacts[0].content, "print('hi')");
  }

  #[test]
  fn null_output_yields_nothing() {
    assert!(artifacts(&Value::Null, "x").is_empty());
    assert!(design_document(&Value::Null).is_none());
    assert!(test_results(&Value::Null).is_none());
    assert!(recommendations(&Value::Null).is_empty());
  }

  #[test]
  fn design_document_prefers_content() {
    let doc = design_document(&json!({"title": "API", "content": "three layers"})).unwrap();
    assert_eq!(doc.title, "API");
    assert_eq!(doc.content, "three layers");
    assert_eq!(doc.kind, DocKind::Design);

    let doc = design_document(&json!({"components": ["db"]})).unwrap();
    assert_eq!(doc.title, "Architecture design");
    assert!(doc.content.contains("components"));
  }

  #[test]
  fn security_review_skips_malformed_entries() {
    let review = security_review(&json!({
      "vulnerabilities": [
        { "kind": "xss", "severity": "high", "description": "unescaped output" },
        { "kind": "weird", "severity": "apocalyptic" }
      ],
      "recommendations": ["escape output", 7]
    }));
    assert_eq!(review.vulnerabilities.len(), 1);
    assert_eq!(review.vulnerabilities[0].severity, Severity::High);
    assert_eq!(review.recommendations, vec!["escape output"]);
  }

  #[test]
  fn test_results_at_top_level_or_nested() {
    let top = test_results(&json!({"total": 4, "passed": 3, "failed": 1})).unwrap();
    assert_eq!(top.failed, 1);

    let nested = test_results(&json!({
      "results": { "cases": [{"name": "a", "passed": true}] }
    }))
    .unwrap();
    assert_eq!(nested.total, 1);

    assert!(test_results(&json!({"text": "ran fine"})).is_none());
  }

  #[test]
  fn quality_review_reads_performance() {
    let review = quality_review(&json!({
      "quality": { "maintainability": 0.8 },
      "performance": { "bottlenecks": ["n+1 query"] }
    }));
    assert_eq!(review.quality.unwrap().maintainability, 0.8);
    assert_eq!(review.performance.unwrap().bottlenecks, vec!["n+1 query"]);
  }
}
