pub mod durable;
pub mod executor;
pub mod function;
pub mod output;
pub mod registry;

pub use durable::{as_step, translate_tool_error, DurableTool, DEFAULT_STEP_PREFIX};
pub use executor::{ToolExecutor, ToolInvocation};
pub use function::FunctionTool;
pub use output::{shape_value, ToolOutput, ToolStepRecord};
pub use registry::{Tool, ToolError, ToolRegistry};
