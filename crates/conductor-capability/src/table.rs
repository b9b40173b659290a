//! Static phase capability table.
//!
//! Declares every operation a phase may perform along with the fields its
//! input carries and the fields its output is expected to carry. Outputs are
//! decoded leniently, so the output fields are what the engine looks for, not
//! what it requires.

use conductor_task::{Operation, Phase};
use serde::Serialize;

/// Declared shape of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationSpec {
  pub operation: Operation,
  pub phase: Phase,
  pub description: &'static str,
  pub input: &'static [&'static str],
  pub output: &'static [&'static str],
}

/// Every operation, in pipeline order.
pub static OPERATIONS: [OperationSpec; 8] = [
  OperationSpec {
    operation: Operation::AnalyzeProject,
    phase: Phase::Orchestrator,
    description: "Analyze the request and project context",
    input: &["description", "context"],
    output: &["summary", "components", "risks"],
  },
  OperationSpec {
    operation: Operation::DecomposeTask,
    phase: Phase::Orchestrator,
    description: "Break the request into an ordered implementation plan",
    input: &["analysis", "description"],
    output: &["steps", "recommendations"],
  },
  OperationSpec {
    operation: Operation::DesignArchitecture,
    phase: Phase::Architect,
    description: "Design the architecture for the planned change",
    input: &["plan", "requirements"],
    output: &["title", "content", "components"],
  },
  OperationSpec {
    operation: Operation::Implement,
    phase: Phase::Coder,
    description: "Write the code for the plan",
    input: &["plan", "context", "design"],
    output: &["files"],
  },
  OperationSpec {
    operation: Operation::ReviewQuality,
    phase: Phase::Reviewer,
    description: "Review generated code for quality and performance",
    input: &["code"],
    output: &["quality", "recommendations", "performance"],
  },
  OperationSpec {
    operation: Operation::ReviewSecurity,
    phase: Phase::Reviewer,
    description: "Review generated code for vulnerabilities and compliance",
    input: &["code", "security_requirements"],
    output: &["vulnerabilities", "compliance", "recommendations"],
  },
  OperationSpec {
    operation: Operation::GenerateTests,
    phase: Phase::Tester,
    description: "Generate tests for the code",
    input: &["code"],
    output: &["files"],
  },
  OperationSpec {
    operation: Operation::RunTests,
    phase: Phase::Tester,
    description: "Run the generated tests and report results",
    input: &["tests"],
    output: &["total", "passed", "failed", "coverage", "cases"],
  },
];

/// Declared shape of `operation`.
pub fn spec(operation: Operation) -> &'static OperationSpec {
  // The table is exhaustive and ordered like the enum.
  &OPERATIONS[operation as usize]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_matches_operation_enum() {
    for phase in Phase::ALL {
      for op in phase.operations() {
        let spec = spec(*op);
        assert_eq!(spec.operation, *op);
        assert_eq!(spec.phase, phase);
      }
    }
  }
}
