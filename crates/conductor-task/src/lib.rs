//! Conductor Task
//!
//! This crate contains the data model shared by every part of the conductor
//! engine: the [`Task`] a caller submits, the [`ExecutionStep`] records a
//! pipeline appends while it runs, and the [`TaskReport`] that replaces the live
//! task once it reaches a terminal status.
//!
//! It also hosts the submission heuristics in [`intake`], which derive a task's
//! priority, complexity score and required capabilities from its description
//! and context.

mod context;
pub mod intake;
mod phase;
mod report;
mod status;
mod step;
mod task;

pub use context::{Context, PerformanceRequirement, SecurityLevel, SecurityRequirement};
pub use intake::Assessment;
pub use phase::{Capability, Operation, Phase};
pub use report::{
  AgentError, CodeArtifact, ComplianceCheck, DocKind, Documentation, PerformanceAnalysis,
  PerformanceMetric, QualityMetrics, SecurityAnalysis, Severity, TaskReport, TestCase,
  TestResults, Vulnerability,
};
pub use status::{Priority, TaskStatus, TransitionError};
pub use step::{ExecutionLog, ExecutionStep};
pub use task::{Progress, Task, TaskId};
