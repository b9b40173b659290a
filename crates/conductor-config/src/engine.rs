use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use conductor_task::Phase;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::provider::ProviderConfig;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub scheduler: SchedulerConfig,
  pub executor: ExecutorConfig,
  pub provider: ProviderConfig,
}

impl EngineConfig {
  /// Load a config file. `.yaml` and `.yml` files are parsed as YAML,
  /// everything else as JSON.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
      Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
      _ => Ok(serde_json::from_str(&content)?),
    }
  }

  /// Load `path` if it exists, otherwise return the defaults.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if path.exists() {
      Self::load(path)
    } else {
      Ok(Self::default())
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
  /// Maximum number of tasks in flight at once.
  pub max_concurrent: usize,
  /// Fallback tick for the scheduling loop.
  pub poll_interval_ms: u64,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      max_concurrent: 3,
      poll_interval_ms: 5000,
    }
  }
}

impl SchedulerConfig {
  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
  /// Per-step deadline. No deadline when unset.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub step_timeout_ms: Option<u64>,
  /// Identity used for tool invocations.
  pub caller: CallerConfig,
  /// Directive template overrides, keyed by phase.
  pub templates: BTreeMap<Phase, String>,
}

impl ExecutorConfig {
  pub fn step_timeout(&self) -> Option<Duration> {
    self.step_timeout_ms.map(Duration::from_millis)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerConfig {
  pub id: String,
  pub role: String,
  pub permissions: Vec<String>,
}

impl Default for CallerConfig {
  fn default() -> Self {
    Self {
      id: "conductor-autonomous".to_string(),
      role: "autonomous_execution".to_string(),
      permissions: vec!["tools:invoke".to_string()],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::provider::ProviderKind;
  use std::io::Write;

  #[test]
  fn defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.scheduler.max_concurrent, 3);
    assert_eq!(config.scheduler.poll_interval(), Duration::from_secs(5));
    assert!(config.executor.step_timeout().is_none());
    assert_eq!(config.executor.caller.id, "conductor-autonomous");
    assert_eq!(config.provider.kind, ProviderKind::None);
  }

  #[test]
  fn loads_partial_yaml() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
      file,
      "scheduler:\n  max_concurrent: 5\nexecutor:\n  step_timeout_ms: 1500\n  templates:\n    coder: \"write {{{{ operation }}}}\"\nprovider:\n  kind: static\n"
    )
    .unwrap();

    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.scheduler.max_concurrent, 5);
    assert_eq!(config.scheduler.poll_interval_ms, 5000);
    assert_eq!(config.executor.step_timeout(), Some(Duration::from_millis(1500)));
    assert_eq!(
      config.executor.templates.get(&Phase::Coder).map(String::as_str),
      Some("write {{ operation }}")
    );
    assert_eq!(config.provider.kind, ProviderKind::Static);
  }

  #[test]
  fn loads_json_by_default() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"provider": {{"kind": "http", "model": "local-llm"}}}}"#).unwrap();

    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.provider.kind, ProviderKind::Http);
    assert_eq!(config.provider.model, "local-llm");
    assert_eq!(config.scheduler, SchedulerConfig::default());
  }

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::load_or_default(&dir.path().join("absent.yaml")).unwrap();
    assert_eq!(config, EngineConfig::default());

    let err = EngineConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }

  #[test]
  fn malformed_yaml_is_reported() {
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    write!(file, "scheduler: [not, a, map]").unwrap();
    let err = EngineConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
  }
}
