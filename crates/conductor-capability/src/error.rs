use thiserror::Error;

/// Errors returned by a tool registry.
#[derive(Debug, Error)]
pub enum ToolError {
  /// No tool is registered under the given server and name.
  #[error("tool '{server}/{tool}' not found")]
  NotFound { server: String, tool: String },

  /// The caller is not allowed to invoke the tool.
  #[error("caller '{caller_id}' may not invoke '{tool}': missing permission '{permission}'")]
  Denied {
    caller_id: String,
    tool: String,
    permission: String,
  },

  /// The tool ran and reported a failure.
  #[error("tool '{tool}' failed: {message}")]
  Failed { tool: String, message: String },
}
