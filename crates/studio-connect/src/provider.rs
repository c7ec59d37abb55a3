use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use studio_types::Connection;

use crate::apps::ConnectorApp;
use crate::error::Result;

/// A tool definition as published by the connector provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTool {
    /// `APPNAME_ACTION`, passed to the model verbatim
    pub name: String,
    pub description: String,
    pub parameters: Value,
    pub app_id: String,
}

/// Third-party integration backend.
///
/// Implemented over HTTP by [`crate::ComposioClient`]; tests substitute fakes.
#[async_trait]
pub trait ConnectorProvider: Send + Sync {
    async fn list_apps(&self) -> Result<Vec<ConnectorApp>>;

    /// Start the OAuth flow. Returns the URL the user must visit.
    async fn authorize(&self, user_id: &str, app_id: &str) -> Result<String>;

    async fn list_connections(&self, user_id: &str) -> Result<Vec<Connection>>;

    /// Tools for the given apps, scoped to the user's accounts
    async fn get_tools(&self, user_id: &str, app_ids: &[String]) -> Result<Vec<RemoteTool>>;

    async fn execute_tool(&self, user_id: &str, tool_name: &str, arguments: Value) -> Result<Value>;

    async fn revoke(&self, connection_id: &str) -> Result<()>;
}
