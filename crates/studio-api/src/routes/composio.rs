use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use studio_connect::{fallback_apps, ConnectorService};

use crate::auth::AuthenticatedUser;
use crate::error::{required, ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectRequest {
    #[serde(alias = "app_id")]
    pub app_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisconnectRequest {
    #[serde(alias = "connection_id")]
    pub connection_id: Option<String>,
}

fn connectors(state: &AppState) -> ApiResult<&ConnectorService> {
    state
        .connectors
        .as_ref()
        .ok_or_else(|| ApiError::Config("COMPOSIO_API_KEY is not set".to_string()))
}

/// Catalogue of connectable apps. Without a connector key the built-in list is served.
pub async fn list_apps(State(state): State<Arc<AppState>>, _user: AuthenticatedUser) -> Json<Value> {
    let apps = match &state.connectors {
        Some(service) => service.available_apps().await,
        None => fallback_apps(),
    };
    Json(json!({ "success": true, "apps": apps }))
}

pub async fn list_connections(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let connections = connectors(&state)?.connections(&user.id).await?;
    Ok(Json(json!({ "success": true, "connections": connections })))
}

pub async fn connect(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(req): JsonBody<ConnectRequest>,
) -> ApiResult<Json<Value>> {
    let app_id = required(req.app_id, "appId è richiesto")?;
    let auth_url = connectors(&state)?.connect(&user.id, &app_id).await?;
    Ok(Json(json!({ "success": true, "authUrl": auth_url })))
}

pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(req): JsonBody<DisconnectRequest>,
) -> ApiResult<Json<Value>> {
    let connection_id = required(req.connection_id, "connectionId è richiesto")?;
    connectors(&state)?.disconnect(&user.id, &connection_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Connessione {} disconnessa con successo", connection_id)
    })))
}

/// Connector tools the agent would get for this caller right now
pub async fn list_tools(State(state): State<Arc<AppState>>, user: AuthenticatedUser) -> ApiResult<Json<Value>> {
    let tools: Vec<Value> = connectors(&state)?
        .get_tools_for_user(&user.id)
        .await
        .into_tools()
        .iter()
        .map(|tool| {
            let definition = tool.definition();
            json!({
                "name": definition.name,
                "description": definition.description,
                "parameters": definition.parameters,
            })
        })
        .collect();

    Ok(Json(json!({ "success": true, "count": tools.len(), "tools": tools })))
}
