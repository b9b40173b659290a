//! Conductor Provider
//!
//! Language-model completion providers. The engine never talks to a model
//! directly: it asks the [`ProviderRegistry`] for the active
//! [`CompletionProvider`] and sends it a rendered [`Directive`].
//!
//! Bundled providers:
//! - [`HttpProvider`]: OpenAI-compatible chat completions over HTTP.
//! - [`StaticProvider`]: canned responses, for tests and offline runs.

mod canned;
mod directive;
mod error;
mod http;
mod registry;

pub use canned::StaticProvider;
pub use directive::Directive;
pub use error::ProviderError;
pub use http::{DEFAULT_BASE_URL, HttpProvider};
pub use registry::ProviderRegistry;

use async_trait::async_trait;

/// A source of language-model completions.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
  /// Name the provider is registered under.
  fn name(&self) -> &str;

  /// Complete a directive, returning the raw response text.
  async fn complete(&self, directive: &Directive) -> Result<String, ProviderError>;
}
