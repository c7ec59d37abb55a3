pub mod assembly;
pub mod config;
pub mod connection;
pub mod events;
pub mod history;
pub mod message;
pub mod part;
pub mod state;
pub mod thread;

pub use assembly::PartsAccumulator;
pub use config::{AgentProfile, GraphConfig, LLMConfig, StopPolicy};
pub use connection::{Connection, ConnectionStatus};
pub use events::{StreamEvent, TurnStatus};
pub use history::to_llm_messages;
pub use message::{ChatMessage, NewMessage, Role};
pub use part::{Part, StateTransitionError, TextPart, ToolPart, ToolState};
pub use state::GraphState;
pub use thread::{derive_title, NewThread, Thread, ThreadUpdate, ThreadWithMessages};
