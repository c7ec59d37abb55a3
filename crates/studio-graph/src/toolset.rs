use studio_connect::ConnectorService;
use studio_tools::{ToolCatalog, ToolRegistry};
use studio_types::AgentProfile;
use tracing::debug;

/// Builds the tool set for one turn: the agent's built-ins plus, when the agent
/// allows it, the caller's connector tools fetched fresh.
#[derive(Clone, Default)]
pub struct ToolResolver {
    catalog: ToolCatalog,
    connectors: Option<ConnectorService>,
}

impl ToolResolver {
    pub fn new(catalog: ToolCatalog) -> Self {
        Self {
            catalog,
            connectors: None,
        }
    }

    pub fn with_connectors(mut self, connectors: ConnectorService) -> Self {
        self.connectors = Some(connectors);
        self
    }

    /// Never fails: unreachable connectors leave only the built-ins.
    pub async fn resolve(&self, agent: &AgentProfile, user_id: &str) -> ToolRegistry {
        let mut registry = self.catalog.registry_for(&agent.builtin_tools);

        if agent.connectors {
            if let Some(connectors) = &self.connectors {
                let set = connectors.get_tools_for_user(user_id).await;
                let added = registry.merge_connectors(set.into_tools());
                debug!(user_id = %user_id, connector_tools = added, "Merged connector tools");
            }
        }

        registry
    }
}
