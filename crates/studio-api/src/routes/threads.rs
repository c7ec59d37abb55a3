use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use studio_types::{AgentProfile, NewThread, Thread, ThreadUpdate};

use crate::auth::AuthenticatedUser;
use crate::error::{required, ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;

pub const MODEL_PROVIDER: &str = "OpenRouter";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateThreadRequest {
    pub id: Option<String>,
    pub first_message: Option<String>,
    #[serde(alias = "agent_id")]
    pub agent_id: Option<String>,
    #[serde(alias = "model_name")]
    pub model_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThreadQuery {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateThreadRequest {
    pub title: Option<String>,
    #[serde(alias = "agent_id")]
    pub agent_id: Option<String>,
    #[serde(alias = "model_id")]
    pub model_id: Option<String>,
}

/// Thread row for a new conversation, with display names for agent and model
pub fn new_thread(
    id: &str,
    user_id: &str,
    first_message: &str,
    agent: &AgentProfile,
    model: &str,
) -> NewThread {
    NewThread::new(id, user_id, first_message, agent.id.clone(), model)
        .with_agent_name(agent.name.clone())
        .with_model_details(model, MODEL_PROVIDER)
}

/// Load a thread the caller owns. Someone else's thread reads as missing.
pub async fn owned_thread(state: &AppState, thread_id: &str, user: &AuthenticatedUser) -> ApiResult<Thread> {
    match state.persistence.get_thread(thread_id).await? {
        Some(thread) if thread.user_id == user.id => Ok(thread),
        _ => Err(ApiError::ThreadNotFound(thread_id.to_string())),
    }
}

pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(req): JsonBody<CreateThreadRequest>,
) -> ApiResult<Json<Value>> {
    const MISSING: &str = "ID thread e primo messaggio sono richiesti";
    let id = required(req.id, MISSING)?;
    let first_message = required(req.first_message, MISSING)?;

    let agent = AgentProfile::resolve(req.agent_id.as_deref());
    let model = state.config.llm.for_model(req.model_name.as_deref()).model;

    let thread = state
        .persistence
        .create_thread(new_thread(&id, &user.id, &first_message, &agent, &model))
        .await?;

    tracing::info!(thread_id = %thread.id, user_id = %user.id, "Thread created");
    Ok(Json(json!({ "success": true, "thread": thread })))
}

/// `GET /threads` lists the caller's threads; `GET /threads?id=` returns one with its messages.
pub async fn get_threads(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<ThreadQuery>,
) -> ApiResult<Json<Value>> {
    if let Some(thread_id) = query.id.filter(|id| !id.is_empty()) {
        owned_thread(&state, &thread_id, &user).await?;
        let thread = state
            .persistence
            .get_thread_with_messages(&thread_id)
            .await?
            .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;
        return Ok(Json(json!({ "success": true, "thread": thread })));
    }

    let threads = state.persistence.list_threads(&user.id).await?;
    Ok(Json(json!({ "success": true, "threads": threads })))
}

pub async fn update_thread(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(thread_id): Path<String>,
    JsonBody(req): JsonBody<UpdateThreadRequest>,
) -> ApiResult<Json<Value>> {
    owned_thread(&state, &thread_id, &user).await?;

    let updated = match req.title.filter(|t| !t.trim().is_empty()) {
        Some(title) => state.persistence.update_thread_title(&thread_id, &title).await?,
        None => {
            let agent = req.agent_id.map(|id| AgentProfile::resolve(Some(&id)));
            let update = ThreadUpdate {
                agent_id: agent.as_ref().map(|a| a.id.clone()),
                agent_name: agent.map(|a| a.name),
                model_name: req.model_id.clone(),
                model_id: req.model_id,
                ..Default::default()
            };
            if update.is_empty() {
                return Err(ApiError::BadRequest("Nessun campo da aggiornare".to_string()));
            }
            state.persistence.update_thread(&thread_id, update).await?
        }
    };

    let thread = updated.ok_or(ApiError::ThreadNotFound(thread_id))?;
    Ok(Json(json!({ "success": true, "thread": thread })))
}

pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Value>> {
    owned_thread(&state, &thread_id, &user).await?;

    if !state.persistence.delete_thread(&thread_id).await? {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    tracing::info!(thread_id = %thread_id, "Thread deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Thread eliminato con successo"
    })))
}
