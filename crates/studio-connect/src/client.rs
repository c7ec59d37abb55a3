// Composio REST client. Payload shapes vary between API versions, so responses
// are read as loose JSON and mapped field by field.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};
use studio_types::{Connection, ConnectionStatus};
use tracing::debug;
use url::Url;

use crate::apps::{fallback_icon, ConnectorApp};
use crate::error::{ConnectorError, Result};
use crate::provider::{ConnectorProvider, RemoteTool};

pub const COMPOSIO_API_BASE: &str = "https://backend.composio.dev";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ComposioClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl ComposioClient {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api_key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-API-Key",
            HeaderValue::from_str(api_key).map_err(|_| ConnectorError::Config("invalid API key".to_string()))?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: parse_base(COMPOSIO_API_BASE)?,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base(base_url)?;
        Ok(self)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConnectorError::Config("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ConnectorError::InvalidResponse(e.to_string()))
    }
}

fn parse_base(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| ConnectorError::Config(format!("invalid base URL '{}': {}", base_url, e)))
}

/// List payloads arrive bare or wrapped under one of `keys`
fn list_items(value: Value, keys: &[&str]) -> Vec<Value> {
    if let Value::Array(items) = value {
        return items;
    }
    keys.iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_array()).cloned())
        .unwrap_or_default()
}

fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|i| i.as_str().map(String::from)).collect())
        .unwrap_or_default()
}

pub(crate) fn map_app(raw: &Value) -> ConnectorApp {
    let name = str_field(raw, &["name", "displayName"]).unwrap_or_else(|| "Unknown App".to_string());
    let id = str_field(raw, &["key", "appId"])
        .unwrap_or_else(|| name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_"));
    let description = str_field(raw, &["description", "tagline"])
        .unwrap_or_else(|| format!("Integrazione con {}", name));
    let category = raw
        .get("categories")
        .and_then(|c| c.get(0))
        .and_then(|c| c.as_str())
        .map(String::from)
        .or_else(|| str_field(raw, &["category"]))
        .unwrap_or_else(|| "other".to_string());
    let permissions = raw
        .get("auth_schemes")
        .and_then(|s| s.as_array())
        .map(|schemes| {
            schemes
                .iter()
                .filter_map(|s| s.get("mode").and_then(|m| m.as_str()).map(String::from))
                .collect()
        })
        .unwrap_or_default();

    ConnectorApp {
        id,
        name,
        description,
        icon: str_field(raw, &["logo", "icon"]),
        category,
        permissions,
    }
}

pub(crate) fn map_connection(raw: &Value, user_id: &str, now: DateTime<Utc>) -> Connection {
    let app_name = str_field(raw, &["appName", "app"]).unwrap_or_else(|| "Unknown App".to_string());
    let app_id = str_field(raw, &["appName", "appId", "app"]).unwrap_or_else(|| app_name.to_lowercase());
    let app_icon = str_field(raw, &["logo", "icon", "appIcon"]).or_else(|| fallback_icon(&app_id, &app_name));
    let id = str_field(raw, &["id", "connectionId"])
        .unwrap_or_else(|| format!("{}_{}", app_name, now.timestamp_millis()));
    let created_at = str_field(raw, &["createdAt", "created_at"])
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now);

    Connection {
        id,
        user_id: user_id.to_string(),
        app_id,
        app_name,
        app_icon,
        status: ConnectionStatus::from_provider(raw.get("status").and_then(|s| s.as_str()).unwrap_or_default()),
        permissions: string_list(raw.get("scopes")),
        created_at,
    }
}

pub(crate) fn map_tool(raw: &Value) -> Option<RemoteTool> {
    let name = str_field(raw, &["name", "slug"])?;
    Some(RemoteTool {
        description: str_field(raw, &["description", "displayName"]).unwrap_or_else(|| name.clone()),
        parameters: raw
            .get("parameters")
            .or_else(|| raw.get("input_parameters"))
            .cloned()
            .unwrap_or_else(|| json!({"type": "object", "properties": {}})),
        app_id: str_field(raw, &["appName", "appKey", "toolkit"]).unwrap_or_default().to_lowercase(),
        name,
    })
}

#[async_trait]
impl ConnectorProvider for ComposioClient {
    async fn list_apps(&self) -> Result<Vec<ConnectorApp>> {
        let response = self.http_client.get(self.endpoint(&["api", "v1", "apps"])?).send().await?;
        let body = Self::read_json(response).await?;
        let apps: Vec<ConnectorApp> = list_items(body, &["items", "apps"]).iter().map(map_app).collect();
        debug!(count = apps.len(), "Fetched connector apps");
        Ok(apps)
    }

    async fn authorize(&self, user_id: &str, app_id: &str) -> Result<String> {
        let response = self
            .http_client
            .post(self.endpoint(&["api", "v2", "connectedAccounts", "initiateConnection"])?)
            .json(&json!({ "appName": app_id, "entityId": user_id }))
            .send()
            .await?;
        let body = Self::read_json(response).await?;
        str_field(&body, &["redirectUrl", "redirect_url"])
            .ok_or_else(|| ConnectorError::InvalidResponse("missing redirectUrl".to_string()))
    }

    async fn list_connections(&self, user_id: &str) -> Result<Vec<Connection>> {
        let response = self
            .http_client
            .get(self.endpoint(&["api", "v1", "connectedAccounts"])?)
            .query(&[("user_uuid", user_id)])
            .send()
            .await?;
        let body = Self::read_json(response).await?;
        let now = Utc::now();
        let connections: Vec<Connection> = list_items(body, &["items", "connectedAccounts"])
            .iter()
            .map(|raw| map_connection(raw, user_id, now))
            .collect();
        debug!(user_id = %user_id, count = connections.len(), "Fetched user connections");
        Ok(connections)
    }

    async fn get_tools(&self, user_id: &str, app_ids: &[String]) -> Result<Vec<RemoteTool>> {
        let response = self
            .http_client
            .get(self.endpoint(&["api", "v2", "actions"])?)
            .query(&[("apps", app_ids.join(",").as_str()), ("entityId", user_id)])
            .send()
            .await?;
        let body = Self::read_json(response).await?;
        Ok(list_items(body, &["items", "actions"]).iter().filter_map(map_tool).collect())
    }

    async fn execute_tool(&self, user_id: &str, tool_name: &str, arguments: Value) -> Result<Value> {
        let response = self
            .http_client
            .post(self.endpoint(&["api", "v2", "actions", tool_name, "execute"])?)
            .json(&json!({ "entityId": user_id, "input": arguments }))
            .send()
            .await?;
        let body = Self::read_json(response).await?;

        // The API has spelled this flag both ways
        let successful = body
            .get("successful")
            .or_else(|| body.get("successfull"))
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        if !successful {
            let message = str_field(&body, &["error"]).unwrap_or_else(|| "tool execution failed".to_string());
            return Err(ConnectorError::Execution(message));
        }
        Ok(body.get("data").cloned().unwrap_or(body))
    }

    async fn revoke(&self, connection_id: &str) -> Result<()> {
        let response = self
            .http_client
            .delete(self.endpoint(&["api", "v1", "connectedAccounts", connection_id])?)
            .send()
            .await?;
        Self::read_json(response).await?;
        Ok(())
    }
}
