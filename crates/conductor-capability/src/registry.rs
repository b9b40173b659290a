use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Permission a caller needs to invoke tools.
pub const INVOKE_PERMISSION: &str = "tools:invoke";

/// Identity a tool invocation runs under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
  pub caller_id: String,
  pub role: String,
  #[serde(default)]
  pub permissions: Vec<String>,
  /// Session the call belongs to. The engine uses the task id.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub session_id: Option<String>,
}

impl CallerContext {
  pub fn new(caller_id: impl Into<String>, role: impl Into<String>) -> Self {
    Self {
      caller_id: caller_id.into(),
      role: role.into(),
      permissions: Vec::new(),
      session_id: None,
    }
  }

  pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
    self.permissions.push(permission.into());
    self
  }

  /// Copy of this context scoped to a session.
  pub fn for_session(&self, session_id: impl Into<String>) -> Self {
    Self {
      session_id: Some(session_id.into()),
      ..self.clone()
    }
  }

  pub fn has_permission(&self, permission: &str) -> bool {
    self.permissions.iter().any(|p| p == permission)
  }
}

/// A tool advertised by a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
  /// Server (provider) that hosts the tool.
  pub server: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  /// JSON schema of the tool's input.
  #[serde(default)]
  pub input_schema: serde_json::Value,
}

impl CapabilityDescriptor {
  pub fn new(
    server: impl Into<String>,
    name: impl Into<String>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      server: server.into(),
      name: name.into(),
      description: description.into(),
      input_schema: serde_json::Value::Null,
    }
  }

  pub fn with_input_schema(mut self, schema: serde_json::Value) -> Self {
    self.input_schema = schema;
    self
  }
}

/// External provider of named tools.
///
/// Implementations decide which tools a caller can see and whether it may
/// invoke them.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
  /// Tools visible to `caller`.
  async fn list_capabilities(
    &self,
    caller: &CallerContext,
  ) -> Result<Vec<CapabilityDescriptor>, ToolError>;

  /// Execute `tool` hosted by `server` with the given input.
  async fn invoke(
    &self,
    server: &str,
    tool: &str,
    input: serde_json::Value,
    caller: &CallerContext,
  ) -> Result<serde_json::Value, ToolError>;
}
