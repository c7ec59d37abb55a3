pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod openai;
pub mod config;

pub use traits::{
    ChatClient,
    ChatRequest, ChatResponse, ChatOptions,
    ResponseFormat,
    TokenUsage,
    EventStream,
};

pub use streaming::{StreamEvent, ChatChunkParser};
pub use buffer_utils::{CircularLineBuffer, SseLineParser, parse_sse_stream};
pub use openai::OpenAIClient;
pub use config::{ClientFactory, ProviderConfig, ProviderType};
pub use types::{Message, Content, Tool, ToolCall, ToolChoice};
