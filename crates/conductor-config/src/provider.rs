use serde::{Deserialize, Serialize};

/// Which completion provider to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
  /// OpenAI-compatible HTTP endpoint.
  Http,
  /// Canned responses.
  Static,
  /// No provider. Every step that needs a model fails.
  #[default]
  None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
  pub kind: ProviderKind,
  /// Endpoint base URL. Defaults to the public OpenAI API.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_url: Option<String>,
  pub model: String,
  /// API key. Falls back to `OPENAI_API_KEY`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub api_key: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_tokens: Option<u32>,
  /// Response returned by the static provider.
  pub static_response: String,
}

impl Default for ProviderConfig {
  fn default() -> Self {
    Self {
      kind: ProviderKind::None,
      base_url: None,
      model: "gpt-4o-mini".to_string(),
      api_key: None,
      max_tokens: None,
      static_response: "{}".to_string(),
    }
  }
}
