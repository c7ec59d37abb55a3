pub mod builder;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod prompts;
pub mod router;
pub mod toolset;

pub use builder::GraphBuilder;
pub use graph::{Graph, TurnInput};
pub use node::{EventSender, Node, NodeType};
pub use prompts::{PromptContext, TimeInfo};
pub use router::{NextNode, PolicyRouter, Router};
pub use toolset::ToolResolver;
pub use tokio_util::sync::CancellationToken;

pub use studio_types::{AgentProfile, GraphConfig, GraphState, LLMConfig, StopPolicy, StreamEvent, TurnStatus};
