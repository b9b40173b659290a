use conductor_task::{CodeArtifact, Context, Operation, SecurityRequirement};
use serde::Serialize;

/// Input for one pipeline operation.
///
/// Serializes to the bare payload object, which is what gets recorded as the
/// step input, rendered into directives and sent to tools.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PhaseRequest {
  AnalyzeProject {
    description: String,
    context: Context,
  },
  DecomposeTask {
    analysis: serde_json::Value,
    description: String,
  },
  DesignArchitecture {
    plan: serde_json::Value,
    requirements: String,
  },
  Implement {
    plan: serde_json::Value,
    context: Context,
    design: serde_json::Value,
  },
  ReviewQuality {
    code: Vec<CodeArtifact>,
  },
  ReviewSecurity {
    code: Vec<CodeArtifact>,
    security_requirements: Vec<SecurityRequirement>,
  },
  GenerateTests {
    code: Vec<CodeArtifact>,
  },
  RunTests {
    tests: Vec<CodeArtifact>,
  },
}

impl PhaseRequest {
  pub fn operation(&self) -> Operation {
    match self {
      PhaseRequest::AnalyzeProject { .. } => Operation::AnalyzeProject,
      PhaseRequest::DecomposeTask { .. } => Operation::DecomposeTask,
      PhaseRequest::DesignArchitecture { .. } => Operation::DesignArchitecture,
      PhaseRequest::Implement { .. } => Operation::Implement,
      PhaseRequest::ReviewQuality { .. } => Operation::ReviewQuality,
      PhaseRequest::ReviewSecurity { .. } => Operation::ReviewSecurity,
      PhaseRequest::GenerateTests { .. } => Operation::GenerateTests,
      PhaseRequest::RunTests { .. } => Operation::RunTests,
    }
  }

  /// The payload as JSON.
  pub fn to_input(&self) -> serde_json::Value {
    serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
  }
}
