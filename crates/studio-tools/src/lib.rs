//! Tools the Studio agent can call.
//!
//! Every capability implements [`Tool`]: a static definition the model sees plus
//! an async `execute`. Built-ins live here; connector tools are supplied per user
//! by `studio-connect` and merged into the same [`ToolRegistry`].

pub mod completion;
pub mod error;
pub mod planning;
pub mod registry;
pub mod search;

pub use completion::TaskCompletedTool;
pub use error::{SearchError, ToolError};
pub use planning::TaskPlanningTool;
pub use registry::{Tool, ToolCatalog, ToolDefinition, ToolKind, ToolRegistry};
pub use search::SmartSearchTool;

pub const SMART_SEARCH: &str = "smartSearch";
pub const TASK_PLANNING: &str = "taskPlanning";
pub const TASK_COMPLETED: &str = "taskCompleted";

pub(crate) fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
