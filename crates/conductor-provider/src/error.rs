use thiserror::Error;

/// Errors from completion providers.
#[derive(Debug, Error)]
pub enum ProviderError {
  /// Transport failure talking to the provider.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The provider answered with something that is not a completion.
  #[error("invalid response from '{provider}': {message}")]
  InvalidResponse { provider: String, message: String },

  /// The provider is missing required configuration.
  #[error("provider '{provider}' is not configured: {message}")]
  NotConfigured { provider: String, message: String },

  /// The provider refused the request.
  #[error("provider '{provider}' rejected the request: {message}")]
  Rejected { provider: String, message: String },
}
