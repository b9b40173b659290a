//! Conductor Config
//!
//! Serializable configuration for the engine. Every field has a default, so a
//! config file only needs the keys it wants to change.
//!
//! Configuration can be loaded from YAML (`.yaml`, `.yml`) or JSON files with
//! [`EngineConfig::load`].

mod engine;
mod error;
mod provider;

pub use engine::{CallerConfig, EngineConfig, ExecutorConfig, SchedulerConfig};
pub use error::ConfigError;
pub use provider::{ProviderConfig, ProviderKind};
