//! Phase, operation and capability identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stage in the fixed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Orchestrator,
  Architect,
  Coder,
  Reviewer,
  Tester,
}

impl Phase {
  /// Every phase, in pipeline order.
  pub const ALL: [Phase; 5] = [
    Phase::Orchestrator,
    Phase::Architect,
    Phase::Coder,
    Phase::Reviewer,
    Phase::Tester,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::Orchestrator => "orchestrator",
      Phase::Architect => "architect",
      Phase::Coder => "coder",
      Phase::Reviewer => "reviewer",
      Phase::Tester => "tester",
    }
  }

  /// Operations this phase performs, in the order the pipeline runs them.
  pub fn operations(&self) -> &'static [Operation] {
    match self {
      Phase::Orchestrator => &[Operation::AnalyzeProject, Operation::DecomposeTask],
      Phase::Architect => &[Operation::DesignArchitecture],
      Phase::Coder => &[Operation::Implement],
      Phase::Reviewer => &[Operation::ReviewQuality, Operation::ReviewSecurity],
      Phase::Tester => &[Operation::GenerateTests, Operation::RunTests],
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A named operation performed by exactly one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
  AnalyzeProject,
  DecomposeTask,
  DesignArchitecture,
  Implement,
  ReviewQuality,
  ReviewSecurity,
  GenerateTests,
  RunTests,
}

impl Operation {
  pub fn as_str(&self) -> &'static str {
    match self {
      Operation::AnalyzeProject => "analyze_project",
      Operation::DecomposeTask => "decompose_task",
      Operation::DesignArchitecture => "design_architecture",
      Operation::Implement => "implement",
      Operation::ReviewQuality => "review_quality",
      Operation::ReviewSecurity => "review_security",
      Operation::GenerateTests => "generate_tests",
      Operation::RunTests => "run_tests",
    }
  }

  /// The phase that owns this operation.
  pub fn phase(&self) -> Phase {
    match self {
      Operation::AnalyzeProject | Operation::DecomposeTask => Phase::Orchestrator,
      Operation::DesignArchitecture => Phase::Architect,
      Operation::Implement => Phase::Coder,
      Operation::ReviewQuality | Operation::ReviewSecurity => Phase::Reviewer,
      Operation::GenerateTests | Operation::RunTests => Phase::Tester,
    }
  }

  /// Human readable form, e.g. "analyze project".
  pub fn label(&self) -> String {
    self.as_str().replace('_', " ")
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A capability a task may require. Drives conditional phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
  Design,
  Implementation,
  Testing,
  Security,
  Performance,
}

impl Capability {
  pub fn as_str(&self) -> &'static str {
    match self {
      Capability::Design => "design",
      Capability::Implementation => "implementation",
      Capability::Testing => "testing",
      Capability::Security => "security",
      Capability::Performance => "performance",
    }
  }
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
