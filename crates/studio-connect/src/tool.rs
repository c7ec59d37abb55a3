use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use studio_tools::{Tool, ToolDefinition, ToolError, ToolKind};
use tracing::debug;

use crate::provider::{ConnectorProvider, RemoteTool};

/// A provider action bound to one user's connected account
pub struct ConnectorTool {
    definition: ToolDefinition,
    app_id: String,
    user_id: String,
    provider: Arc<dyn ConnectorProvider>,
}

impl ConnectorTool {
    pub fn new(remote: RemoteTool, user_id: impl Into<String>, provider: Arc<dyn ConnectorProvider>) -> Self {
        Self {
            definition: ToolDefinition::new(remote.name, remote.description).with_parameters(remote.parameters),
            app_id: remote.app_id,
            user_id: user_id.into(),
            provider,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

#[async_trait]
impl Tool for ConnectorTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Connector {
            name: self.definition.name.clone(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        debug!(tool = %self.definition.name, user_id = %self.user_id, "Executing connector tool");
        self.provider
            .execute_tool(&self.user_id, &self.definition.name, input)
            .await
            .map_err(|e| ToolError::Upstream(e.to_string()))
    }
}
