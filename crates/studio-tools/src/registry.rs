use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ToolError;
use crate::{SMART_SEARCH, TASK_COMPLETED, TASK_PLANNING};

/// Category of a callable tool, resolved once from its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToolKind {
    SmartSearch,
    TaskPlanning,
    TaskCompleted,
    /// Third-party action exposed through a user's connection
    Connector { name: String },
}

impl ToolKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            SMART_SEARCH => ToolKind::SmartSearch,
            TASK_PLANNING => ToolKind::TaskPlanning,
            TASK_COMPLETED => ToolKind::TaskCompleted,
            other => ToolKind::Connector {
                name: other.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ToolKind::SmartSearch => SMART_SEARCH,
            ToolKind::TaskPlanning => TASK_PLANNING,
            ToolKind::TaskCompleted => TASK_COMPLETED,
            ToolKind::Connector { name } => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, ToolKind::Connector { .. })
    }
}

/// What the model sees for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the input object
    pub parameters: Value,
}

impl ToolDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn to_llm_tool(&self) -> studio_llm::Tool {
        studio_llm::Tool::new(&self.name, &self.description, self.parameters.clone())
    }
}

#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    fn kind(&self) -> ToolKind {
        ToolKind::from_name(&self.definition().name)
    }

    /// Run the tool. Errors become an `output-error` part; they never end the turn.
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;
}

/// Ordered, name-indexed set of tools for one turn
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Returns false and keeps the existing one on a name clash.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> bool {
        let name = tool.definition().name.clone();
        if self.index.contains_key(&name) {
            return false;
        }
        debug!(tool = %name, "Registering tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        true
    }

    /// Add connector tools. Built-in names take precedence; clashing connector
    /// tools are skipped. Returns how many were added.
    pub fn merge_connectors<I>(&mut self, tools: I) -> usize
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut added = 0;
        for tool in tools {
            let name = tool.definition().name.clone();
            if ToolKind::from_name(&name).is_builtin() || !self.register(tool) {
                debug!(tool = %name, "Skipping connector tool that shadows an existing tool");
                continue;
            }
            added += 1;
        }
        added
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.definition().name.as_str()).collect()
    }

    pub fn connector_count(&self) -> usize {
        self.tools.iter().filter(|t| !t.kind().is_builtin()).count()
    }

    pub fn llm_tools(&self) -> Vec<studio_llm::Tool> {
        self.tools.iter().map(|t| t.definition().to_llm_tool()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Application-wide set of built-in tools, from which each agent picks its subset
#[derive(Clone, Default)]
pub struct ToolCatalog {
    builtins: HashMap<String, Arc<dyn Tool>>,
}

impl ToolCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.builtins.insert(tool.definition().name.clone(), tool);
        self
    }

    /// Registry holding the named built-ins in the given order. Unknown names are skipped.
    pub fn registry_for(&self, names: &[String]) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for name in names {
            match self.builtins.get(name) {
                Some(tool) => {
                    registry.register(Arc::clone(tool));
                }
                None => debug!(tool = %name, "Built-in tool not available in catalog"),
            }
        }
        registry
    }
}
