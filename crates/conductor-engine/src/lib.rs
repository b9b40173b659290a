//! Conductor Engine
//!
//! This crate provides the task orchestration engine for conductor. It
//! accepts free-text task requests, admits them under a concurrency ceiling,
//! and drives each through the agent phases to a final report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │  - submit / cancel / get_status / list_running / subscribe  │
//! │  - start(cancel) runs the scheduling loop                   │
//! │  - shutdown() drains the queue                              │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Scheduler                           │
//! │  - FIFO admission from the TaskStore                        │
//! │  - semaphore enforces max_concurrent                        │
//! │  - one spawned pipeline per admitted task                   │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PipelineController                       │
//! │  - analyze → decompose → (design) → implement → review      │
//! │    → test → report                                          │
//! │  - status transitions, progress, report assembly            │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PhaseExecutor                          │
//! │  - tool dispatch, otherwise completion provider             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use conductor_engine::Engine;
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = Arc::new(Engine::from_config(&config, None)?);
//! let cancel = CancellationToken::new();
//! tokio::spawn({
//!   let engine = engine.clone();
//!   async move { engine.start(cancel).await }
//! });
//!
//! let id = engine.submit("Add rate limiting to the login endpoint", Context::default())?;
//! ```

mod decode;
mod engine;
mod error;
mod events;
mod pipeline;
mod scheduler;

pub use engine::{Engine, TaskRequest, providers_from_config};
pub use error::{EngineError, PipelineError, SubmitError};
pub use events::{ChannelNotifier, EngineEvent, EngineNotifier, NoopNotifier};
pub use pipeline::PipelineController;

// Re-export the types callers need to query the engine
pub use conductor_store::{StoreStats, TaskSnapshot};
pub use conductor_task::{Context, Task, TaskId, TaskReport, TaskStatus};
