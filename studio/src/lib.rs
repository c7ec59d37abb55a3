//! # Studio
//!
//! A chat agent that streams model output, calls tools between steps and stores
//! each turn as one multi-part assistant message.
//!
//! - **studio-types**: messages, parts, threads, turn events, agent profiles
//! - **studio-llm**: OpenAI-compatible streaming chat client
//! - **studio-tools**: tool registry plus the built-ins (smart search, planning, completion)
//! - **studio-connect**: third-party connector tools
//! - **studio-persist**: thread and message storage
//! - **studio-graph**: the turn loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use studio::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let llm = ClientFactory::create_chat_client(ProviderConfig::openrouter("sk-or-..."))?;
//!     let catalog = ToolCatalog::new().with_tool(Arc::new(TaskCompletedTool::new()));
//!
//!     let graph = Graph::builder()
//!         .llm_client(llm)
//!         .tools(ToolResolver::new(catalog))
//!         .with_persistence(Arc::new(MemoryPersistenceClient::new()))
//!         .build()?;
//!
//!     let input = TurnInput {
//!         thread_id: "thread-1".into(),
//!         user_id: "user-1".into(),
//!         messages: vec![Message::human("Ciao!")],
//!         agent: AgentProfile::default_agent(),
//!         llm_config: LLMConfig::new("openai/gpt-4.1"),
//!     };
//!
//!     let mut events = graph.spawn_run(input, CancellationToken::new());
//!     while let Some(event) = events.recv().await {
//!         if let StreamEvent::TextDelta { content } = event {
//!             print!("{}", content);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For the HTTP server see the `studio-api` crate.

pub use studio_connect as connect;
pub use studio_graph as graph;
pub use studio_llm as llm;
pub use studio_persist as persist;
pub use studio_tools as tools;
pub use studio_types as types;

pub use studio_connect::{ComposioClient, ConnectorService};
pub use studio_graph::{Graph, GraphBuilder, ToolResolver, TurnInput};
pub use studio_llm::{ChatClient, ClientFactory, Message, OpenAIClient, ProviderConfig};
pub use studio_persist::{MemoryPersistenceClient, PersistenceClient};
pub use studio_tools::{SmartSearchTool, TaskCompletedTool, TaskPlanningTool, Tool, ToolCatalog, ToolRegistry};
pub use studio_types::{AgentProfile, ChatMessage, GraphConfig, LLMConfig, Part, StopPolicy, StreamEvent, Thread};

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::graph::{Graph, ToolResolver, TurnInput};
    pub use crate::llm::{ClientFactory, Message, ProviderConfig};
    pub use crate::persist::{MemoryPersistenceClient, PersistenceClient};
    pub use crate::tools::{TaskCompletedTool, ToolCatalog};
    pub use crate::types::{AgentProfile, GraphConfig, LLMConfig, StreamEvent, TurnStatus};
    pub use anyhow::Result;
    pub use studio_graph::CancellationToken;
}
