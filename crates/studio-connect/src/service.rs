use std::sync::Arc;

use studio_tools::Tool;
use studio_types::Connection;
use tracing::{debug, info, warn};

use crate::apps::{fallback_apps, ConnectorApp};
use crate::error::{ConnectorError, Result};
use crate::provider::ConnectorProvider;
use crate::tool::ConnectorTool;

/// Connector tools resolved for one user and one turn
#[derive(Clone, Default)]
pub struct ConnectorToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ConnectorToolSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.definition().name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn into_tools(self) -> Vec<Arc<dyn Tool>> {
        self.tools
    }
}

/// Application-scoped entry point to the connector provider
#[derive(Clone)]
pub struct ConnectorService {
    provider: Arc<dyn ConnectorProvider>,
}

impl ConnectorService {
    pub fn new(provider: Arc<dyn ConnectorProvider>) -> Self {
        Self { provider }
    }

    /// Provider catalogue, or the fixed fallback list when it fails or is empty
    pub async fn available_apps(&self) -> Vec<ConnectorApp> {
        match self.provider.list_apps().await {
            Ok(apps) if !apps.is_empty() => apps,
            Ok(_) => {
                warn!("Connector provider returned no apps, using fallback catalogue");
                fallback_apps()
            }
            Err(e) => {
                warn!(error = %e, "Failed to list connector apps, using fallback catalogue");
                fallback_apps()
            }
        }
    }

    pub async fn connections(&self, user_id: &str) -> Result<Vec<Connection>> {
        self.provider.list_connections(user_id).await
    }

    pub async fn connect(&self, user_id: &str, app_id: &str) -> Result<String> {
        let url = self.provider.authorize(user_id, app_id).await?;
        info!(user_id = %user_id, app_id = %app_id, "Connector authorization started");
        Ok(url)
    }

    /// Revoke one of the user's connections. Ids owned by anyone else are
    /// reported as missing and never reach the provider.
    pub async fn disconnect(&self, user_id: &str, connection_id: &str) -> Result<()> {
        let owned = self
            .provider
            .list_connections(user_id)
            .await?
            .iter()
            .any(|c| c.id == connection_id);
        if !owned {
            return Err(ConnectorError::ConnectionNotFound(connection_id.to_string()));
        }

        self.provider.revoke(connection_id).await?;
        info!(user_id = %user_id, connection_id = %connection_id, "Connector disconnected");
        Ok(())
    }

    /// Tools for the user's active connections.
    ///
    /// `Ok` with an empty set means the user has nothing active; `Err` means the
    /// provider could not be reached.
    pub async fn fetch_tools_for_user(&self, user_id: &str) -> Result<ConnectorToolSet> {
        let connections = self.provider.list_connections(user_id).await?;

        let mut app_ids: Vec<String> = connections
            .into_iter()
            .filter(Connection::is_active)
            .map(|c| c.app_id)
            .collect();
        app_ids.sort();
        app_ids.dedup();

        if app_ids.is_empty() {
            debug!(user_id = %user_id, "No active connections");
            return Ok(ConnectorToolSet::empty());
        }

        let remote = self.provider.get_tools(user_id, &app_ids).await?;
        let tools: Vec<Arc<dyn Tool>> = remote
            .into_iter()
            .map(|r| Arc::new(ConnectorTool::new(r, user_id, Arc::clone(&self.provider))) as Arc<dyn Tool>)
            .collect();

        info!(user_id = %user_id, apps = ?app_ids, tools = tools.len(), "Loaded connector tools");
        Ok(ConnectorToolSet { tools })
    }

    /// Like [`Self::fetch_tools_for_user`], but a provider failure yields an empty set.
    pub async fn get_tools_for_user(&self, user_id: &str) -> ConnectorToolSet {
        match self.fetch_tools_for_user(user_id).await {
            Ok(set) => set,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Connector tools unavailable, continuing without them");
                ConnectorToolSet::empty()
            }
        }
    }
}
