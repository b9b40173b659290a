//! Conductor Capability
//!
//! Two halves live here:
//!
//! - [`table`]: the static table of what each [`Phase`](conductor_task::Phase)
//!   may do, with the declared input and output shape of every operation.
//!   Pure data.
//! - [`ToolRegistry`]: the seam to an external tool provider that can execute
//!   a named operation on behalf of a caller. [`InMemoryToolRegistry`] is the
//!   bundled implementation.

mod error;
mod memory;
mod registry;
pub mod table;

pub use error::ToolError;
pub use memory::{InMemoryToolRegistry, ToolHandler};
pub use registry::{CallerContext, CapabilityDescriptor, INVOKE_PERMISSION, ToolRegistry};
pub use table::OperationSpec;
