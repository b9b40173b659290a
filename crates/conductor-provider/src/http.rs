use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directive::Directive;
use crate::error::ProviderError;
use crate::CompletionProvider;

/// Default endpoint for OpenAI-compatible APIs.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Completion provider for OpenAI-compatible chat completion endpoints.
#[derive(Debug, Clone)]
pub struct HttpProvider {
  name: String,
  client: Client,
  base_url: String,
  model: String,
  api_key: String,
  max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage<'a>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

impl HttpProvider {
  /// Create a provider.
  ///
  /// The API key falls back to `OPENAI_API_KEY` when `api_key` is `None`.
  pub fn new(
    base_url: Option<String>,
    model: impl Into<String>,
    api_key: Option<String>,
  ) -> Result<Self, ProviderError> {
    let api_key = api_key
      .or_else(|| std::env::var(API_KEY_ENV).ok())
      .filter(|key| !key.is_empty())
      .ok_or_else(|| ProviderError::NotConfigured {
        provider: "http".to_string(),
        message: format!("API key not found in config or {}", API_KEY_ENV),
      })?;

    Ok(Self {
      name: "http".to_string(),
      client: Client::new(),
      base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
      model: model.into(),
      api_key,
      max_tokens: None,
    })
  }

  pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
    self.max_tokens = Some(max_tokens);
    self
  }

  pub fn model(&self) -> &str {
    &self.model
  }

  fn endpoint(&self) -> String {
    format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
  }

  fn invalid(&self, message: impl Into<String>) -> ProviderError {
    ProviderError::InvalidResponse {
      provider: self.name.clone(),
      message: message.into(),
    }
  }
}

#[async_trait]
impl CompletionProvider for HttpProvider {
  fn name(&self) -> &str {
    &self.name
  }

  async fn complete(&self, directive: &Directive) -> Result<String, ProviderError> {
    let request = ChatRequest {
      model: &self.model,
      messages: vec![
        ChatMessage {
          role: "system",
          content: &directive.system,
        },
        ChatMessage {
          role: "user",
          content: &directive.prompt,
        },
      ],
      max_tokens: self.max_tokens,
    };

    debug!(
      provider = %self.name,
      model = %self.model,
      operation = %directive.operation,
      "sending completion request"
    );

    let response = self
      .client
      .post(self.endpoint())
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ProviderError::Rejected {
        provider: self.name.clone(),
        message: format!("status {}: {}", status.as_u16(), body),
      });
    }

    let body: ChatResponse = response
      .json()
      .await
      .map_err(|e| self.invalid(e.to_string()))?;

    body
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or_else(|| self.invalid("response has no choices"))
  }
}
