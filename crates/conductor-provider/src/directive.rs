use conductor_task::{Operation, Phase};
use serde::{Deserialize, Serialize};

/// An instruction for a language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
  pub phase: Phase,
  pub operation: Operation,
  /// Role framing sent as the system message.
  pub system: String,
  /// The rendered instruction.
  pub prompt: String,
}

impl Directive {
  pub fn new(operation: Operation, system: impl Into<String>, prompt: impl Into<String>) -> Self {
    Self {
      phase: operation.phase(),
      operation,
      system: system.into(),
      prompt: prompt.into(),
    }
  }
}
