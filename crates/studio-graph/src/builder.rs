use std::sync::Arc;
use anyhow::{anyhow, Result};

use chrono_tz::Tz;
use studio_llm::ChatClient;
use studio_persist::PersistenceClient;
use studio_types::GraphConfig;

use crate::graph::Graph;
use crate::prompts::{parse_timezone, DEFAULT_TIMEZONE};
use crate::toolset::ToolResolver;

/// Builder for constructing a Graph with optional components
pub struct GraphBuilder {
    llm_client: Option<Arc<dyn ChatClient>>,
    tools: ToolResolver,
    config: GraphConfig,
    timezone: Option<String>,
    persistence: Option<Arc<dyn PersistenceClient>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            llm_client: None,
            tools: ToolResolver::default(),
            config: GraphConfig::default(),
            timezone: None,
            persistence: None,
        }
    }

    /// Set the chat client
    pub fn llm_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    /// Set the tool resolver (built-ins plus optional connectors)
    pub fn tools(mut self, tools: ToolResolver) -> Self {
        self.tools = tools;
        self
    }

    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// IANA timezone used for the date block of the system prompt
    pub fn timezone(mut self, name: impl Into<String>) -> Self {
        self.timezone = Some(name.into());
        self
    }

    /// Enable persistence of the assistant message at the end of each turn
    pub fn with_persistence(mut self, client: Arc<dyn PersistenceClient>) -> Self {
        self.persistence = Some(client);
        self
    }

    pub fn build(self) -> Result<Graph> {
        let llm_client = self.llm_client.ok_or_else(|| anyhow!("LLM client is required"))?;
        let timezone: Tz = parse_timezone(self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE))?;

        Ok(Graph::new(
            llm_client,
            self.tools,
            self.config,
            timezone,
            self.persistence,
        ))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
