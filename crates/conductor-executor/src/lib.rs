//! Conductor Executor
//!
//! Executes one pipeline operation and records it as an
//! [`ExecutionStep`](conductor_task::ExecutionStep).
//!
//! # Flow
//! 1. Resolve the active completion provider. Without one the step fails.
//! 2. Render the phase's directive template against the operation input.
//! 3. Look for a registered tool whose name or description matches the
//!    operation (or, failing that, the phase). A match is invoked with the
//!    executor's caller identity scoped to the task.
//! 4. Otherwise send the directive to the provider.
//! 5. Parse the output as JSON, wrapping plain text as `{"text": ...}`.
//!
//! Every failure along the way (render, tool, provider, timeout,
//! cancellation) becomes a failed step. [`PhaseExecutor::execute`] never
//! returns an error.

mod directive;
mod error;
mod executor;
mod output;
mod request;
mod tools;

pub use directive::DirectiveBuilder;
pub use error::StepError;
pub use executor::PhaseExecutor;
pub use output::parse_output;
pub use request::PhaseRequest;
