//! Conductor Store
//!
//! Holds every task the engine knows about, in one of four collections:
//!
//! - pending: FIFO queue of submitted tasks waiting for a slot
//! - in-flight: tasks whose pipeline is running, each with its cancellation
//!   token
//! - completed: the [`TaskReport`](conductor_task::TaskReport) of every task a
//!   pipeline finished
//! - cancelled: tasks cancelled before their pipeline finished
//!
//! All collections sit behind a single lock, so moving a task between them is
//! atomic. The store makes no scheduling decisions of its own.

mod store;
mod types;

pub use store::TaskStore;
pub use types::{StoreStats, TaskSnapshot};
