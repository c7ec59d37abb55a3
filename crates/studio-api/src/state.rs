use std::sync::Arc;

use studio_connect::ConnectorService;
use studio_graph::Graph;
use studio_persist::PersistenceClient;

use crate::auth::Authenticator;
use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The Graph is stateless and created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persistence: Arc<dyn PersistenceClient>,
    pub graph: Arc<Graph>,
    pub authenticator: Arc<dyn Authenticator>,
    /// Absent when no connector API key is configured
    pub connectors: Option<ConnectorService>,
}

impl AppState {
    pub fn new(
        config: Config,
        persistence: Arc<dyn PersistenceClient>,
        graph: Graph,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            persistence,
            graph: Arc::new(graph),
            authenticator,
            connectors: None,
        }
    }

    pub fn with_connectors(mut self, connectors: ConnectorService) -> Self {
        self.connectors = Some(connectors);
        self
    }
}
