use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ProviderError;
use crate::CompletionProvider;

#[derive(Default)]
struct Inner {
  providers: HashMap<String, Arc<dyn CompletionProvider>>,
  active: Option<String>,
}

/// Named completion providers with one active selection.
///
/// The first provider registered becomes active unless another is selected
/// with [`set_active`](Self::set_active).
#[derive(Clone, Default)]
pub struct ProviderRegistry {
  inner: Arc<RwLock<Inner>>,
}

impl ProviderRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a provider under its own name.
  pub fn register(&self, provider: Arc<dyn CompletionProvider>) {
    let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
    let name = provider.name().to_string();
    if inner.active.is_none() {
      inner.active = Some(name.clone());
    }
    inner.providers.insert(name, provider);
  }

  /// Select the active provider.
  pub fn set_active(&self, name: &str) -> Result<(), ProviderError> {
    let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
    if !inner.providers.contains_key(name) {
      return Err(ProviderError::NotConfigured {
        provider: name.to_string(),
        message: "no provider registered under this name".to_string(),
      });
    }
    inner.active = Some(name.to_string());
    Ok(())
  }

  /// The active provider, if any.
  pub fn active(&self) -> Option<Arc<dyn CompletionProvider>> {
    let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
    inner
      .active
      .as_ref()
      .and_then(|name| inner.providers.get(name))
      .cloned()
  }

  pub fn names(&self) -> Vec<String> {
    let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
    let mut names: Vec<_> = inner.providers.keys().cloned().collect();
    names.sort();
    names
  }
}
