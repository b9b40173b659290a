use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::ToolError;
use crate::registry::{CallerContext, CapabilityDescriptor, INVOKE_PERMISSION, ToolRegistry};

/// The body of a registered tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
  async fn call(
    &self,
    input: serde_json::Value,
    caller: &CallerContext,
  ) -> Result<serde_json::Value, ToolError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
  F: Fn(serde_json::Value) -> Fut + Send + Sync,
  Fut: Future<Output = Result<serde_json::Value, ToolError>> + Send,
{
  async fn call(
    &self,
    input: serde_json::Value,
    _caller: &CallerContext,
  ) -> Result<serde_json::Value, ToolError> {
    (self.0)(input).await
  }
}

struct Entry {
  descriptor: CapabilityDescriptor,
  handler: Arc<dyn ToolHandler>,
}

/// Tool registry backed by in-process handlers.
///
/// Tools are keyed by `(server, name)`. Invocation requires the caller to hold
/// [`INVOKE_PERMISSION`]; listing does not.
#[derive(Clone, Default)]
pub struct InMemoryToolRegistry {
  tools: Arc<RwLock<BTreeMap<(String, String), Entry>>>,
}

impl InMemoryToolRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a handler, replacing any tool with the same server and name.
  pub fn register(&self, descriptor: CapabilityDescriptor, handler: impl ToolHandler + 'static) {
    let key = (descriptor.server.clone(), descriptor.name.clone());
    let entry = Entry {
      descriptor,
      handler: Arc::new(handler),
    };
    self
      .tools
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key, entry);
  }

  /// Register an async closure as a tool.
  pub fn register_fn<F, Fut>(&self, descriptor: CapabilityDescriptor, f: F)
  where
    F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, ToolError>> + Send + 'static,
  {
    self.register(descriptor, FnHandler(f));
  }

  pub fn len(&self) -> usize {
    self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl ToolRegistry for InMemoryToolRegistry {
  async fn list_capabilities(
    &self,
    _caller: &CallerContext,
  ) -> Result<Vec<CapabilityDescriptor>, ToolError> {
    let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
    Ok(tools.values().map(|e| e.descriptor.clone()).collect())
  }

  async fn invoke(
    &self,
    server: &str,
    tool: &str,
    input: serde_json::Value,
    caller: &CallerContext,
  ) -> Result<serde_json::Value, ToolError> {
    if !caller.has_permission(INVOKE_PERMISSION) {
      return Err(ToolError::Denied {
        caller_id: caller.caller_id.clone(),
        tool: tool.to_string(),
        permission: INVOKE_PERMISSION.to_string(),
      });
    }

    // Clone the handler out so the lock is not held across the await.
    let handler = {
      let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
      tools
        .get(&(server.to_string(), tool.to_string()))
        .map(|e| Arc::clone(&e.handler))
    };

    match handler {
      Some(handler) => handler.call(input, caller).await,
      None => Err(ToolError::NotFound {
        server: server.to_string(),
        tool: tool.to_string(),
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn caller() -> CallerContext {
    CallerContext::new("tester", "autonomous_execution").with_permission(INVOKE_PERMISSION)
  }

  struct Echo;

  #[async_trait]
  impl ToolHandler for Echo {
    async fn call(
      &self,
      input: serde_json::Value,
      caller: &CallerContext,
    ) -> Result<serde_json::Value, ToolError> {
      Ok(json!({ "input": input, "session": caller.session_id }))
    }
  }

  #[tokio::test]
  async fn invoke_runs_registered_handler() {
    let registry = InMemoryToolRegistry::new();
    registry.register(CapabilityDescriptor::new("local", "echo", "echo input"), Echo);

    let caller = caller().for_session("task-1");
    let output = registry
      .invoke("local", "echo", json!({"a": 1}), &caller)
      .await
      .unwrap();

    assert_eq!(output["input"]["a"], 1);
    assert_eq!(output["session"], "task-1");
  }

  #[tokio::test]
  async fn closures_can_be_registered() {
    let registry = InMemoryToolRegistry::new();
    registry.register_fn(
      CapabilityDescriptor::new("local", "double", ""),
      |input| async move {
        let n = input["n"].as_i64().unwrap_or_default();
        Ok(json!({ "n": n * 2 }))
      },
    );

    let output = registry
      .invoke("local", "double", json!({"n": 21}), &caller())
      .await
      .unwrap();
    assert_eq!(output["n"], 42);
  }

  #[tokio::test]
  async fn unknown_tool_is_not_found() {
    let registry = InMemoryToolRegistry::new();
    let err = registry
      .invoke("local", "missing", json!({}), &caller())
      .await
      .unwrap_err();
    assert!(matches!(err, ToolError::NotFound { .. }));
  }

  #[tokio::test]
  async fn invoke_requires_permission() {
    let registry = InMemoryToolRegistry::new();
    registry.register(CapabilityDescriptor::new("local", "echo", ""), Echo);

    let anonymous = CallerContext::new("anon", "viewer");
    let err = registry
      .invoke("local", "echo", json!({}), &anonymous)
      .await
      .unwrap_err();
    assert!(matches!(err, ToolError::Denied { .. }));

    // Listing is still allowed.
    let listed = registry.list_capabilities(&anonymous).await.unwrap();
    assert_eq!(listed.len(), 1);
  }

  #[tokio::test]
  async fn registering_twice_replaces() {
    let registry = InMemoryToolRegistry::new();
    registry.register(CapabilityDescriptor::new("local", "echo", "v1"), Echo);
    registry.register(CapabilityDescriptor::new("local", "echo", "v2"), Echo);

    let listed = registry.list_capabilities(&caller()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].description, "v2");
  }
}
