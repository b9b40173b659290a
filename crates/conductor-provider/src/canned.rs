use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use conductor_task::Operation;

use crate::directive::Directive;
use crate::error::ProviderError;
use crate::CompletionProvider;

/// Provider that answers from a fixed table.
///
/// Each operation can be given its own response or failure; everything else
/// gets the default response. An optional delay simulates a slow model.
#[derive(Debug, Default)]
pub struct StaticProvider {
  name: String,
  default_response: String,
  responses: HashMap<Operation, Result<String, String>>,
  delay: Option<Duration>,
  calls: AtomicUsize,
}

impl StaticProvider {
  pub fn new(default_response: impl Into<String>) -> Self {
    Self {
      name: "static".to_string(),
      default_response: default_response.into(),
      ..Self::default()
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn with_response(mut self, operation: Operation, response: impl Into<String>) -> Self {
    self.responses.insert(operation, Ok(response.into()));
    self
  }

  /// Make `operation` fail with `message`.
  pub fn with_failure(mut self, operation: Operation, message: impl Into<String>) -> Self {
    self.responses.insert(operation, Err(message.into()));
    self
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  /// Number of completions requested so far.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl CompletionProvider for StaticProvider {
  fn name(&self) -> &str {
    &self.name
  }

  async fn complete(&self, directive: &Directive) -> Result<String, ProviderError> {
    self.calls.fetch_add(1, Ordering::SeqCst);

    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }

    match self.responses.get(&directive.operation) {
      Some(Ok(response)) => Ok(response.clone()),
      Some(Err(message)) => Err(ProviderError::Rejected {
        provider: self.name.clone(),
        message: message.clone(),
      }),
      None => Ok(self.default_response.clone()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn directive(operation: Operation) -> Directive {
    Directive::new(operation, "system", "prompt")
  }

  #[tokio::test]
  async fn answers_per_operation_with_fallback() {
    let provider = StaticProvider::new("{}")
      .with_response(Operation::Implement, r#"{"files":[]}"#)
      .with_failure(Operation::RunTests, "quota exceeded");

    assert_eq!(
      provider.complete(&directive(Operation::Implement)).await.unwrap(),
      r#"{"files":[]}"#
    );
    assert_eq!(
      provider
        .complete(&directive(Operation::AnalyzeProject))
        .await
        .unwrap(),
      "{}"
    );

    let err = provider
      .complete(&directive(Operation::RunTests))
      .await
      .unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
    assert_eq!(provider.calls(), 3);
  }
}
