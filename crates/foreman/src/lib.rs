pub mod agent;
pub mod errors;
pub mod mcp;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod react;
pub mod registry;
pub mod supervisor;
pub mod toolbox;
pub mod travel;

pub use agent::Agent;
pub use errors::{AgentError, AgentResult};
pub use react::{LoopOptions, UnknownToolPolicy};
pub use registry::{RegisteredTool, ToolHandler, ToolRegistry};
pub use supervisor::{create_supervisor, Supervisor, SupervisorWorkflow};
