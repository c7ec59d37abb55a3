use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use studio_graph::{StreamEvent, TurnInput};
use studio_llm::Message;
use studio_types::{to_llm_messages, AgentProfile, NewMessage};

use crate::auth::AuthenticatedUser;
use crate::error::{required, ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::routes::threads::{new_thread, owned_thread};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    pub messages: Vec<IncomingMessage>,
    #[serde(alias = "thread_id")]
    pub thread_id: Option<String>,
    #[serde(alias = "agent_id")]
    pub agent_id: Option<String>,
    #[serde(alias = "model_name")]
    pub model_name: Option<String>,
}

/// A UI message: either plain `content` or a list of parts
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncomingMessage {
    pub role: String,
    pub content: Option<String>,
    pub parts: Vec<Value>,
}

impl IncomingMessage {
    pub fn text(&self) -> String {
        if let Some(content) = &self.content {
            return content.clone();
        }
        self.parts
            .iter()
            .filter(|p| p.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect()
    }
}

/// Run one turn and stream its events as SSE.
///
/// The thread is created on its first message. The user message is stored
/// before the turn starts; the graph stores the assistant message. If the turn
/// fails before the model produced anything the request fails with 500 instead
/// of opening a stream.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    JsonBody(req): JsonBody<ChatRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let thread_id = required(req.thread_id, "threadId è richiesto")?;
    let user_text = req
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(IncomingMessage::text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Nessun messaggio utente".to_string()))?;

    let agent = AgentProfile::resolve(req.agent_id.as_deref());
    let llm_config = state.config.llm.for_model(req.model_name.as_deref());

    let history = match state.persistence.get_thread(&thread_id).await? {
        None => {
            state
                .persistence
                .create_thread(new_thread(&thread_id, &user.id, &user_text, &agent, &llm_config.model))
                .await?;
            Vec::new()
        }
        Some(_) => {
            owned_thread(&state, &thread_id, &user).await?;
            state.persistence.get_messages(&thread_id).await?
        }
    };

    let mut messages = to_llm_messages(&history);
    messages.push(Message::human(user_text.clone()));

    if let Err(e) = state
        .persistence
        .create_message(NewMessage::user(thread_id.clone(), user_text))
        .await
    {
        tracing::error!(thread_id = %thread_id, error = %e, "Failed to persist user message");
    }
    if let Err(e) = state.persistence.touch_thread(&thread_id).await {
        tracing::warn!(thread_id = %thread_id, error = %e, "Failed to touch thread");
    }

    tracing::info!(
        thread_id = %thread_id,
        user_id = %user.id,
        agent = %agent.id,
        model = %llm_config.model,
        history = history.len(),
        "Chat turn accepted"
    );

    let input = TurnInput {
        thread_id,
        user_id: user.id,
        messages,
        agent,
        llm_config,
    };

    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let mut rx = state.graph.spawn_run(input, cancel);

    let prelude = read_prelude(&mut rx).await?;

    // The guard lives as long as the response body; a client disconnect drops it
    let stream = async_stream::stream! {
        let _guard = guard;
        for event in prelude {
            yield Ok::<Event, Infallible>(to_sse(&event));
        }
        while let Some(event) = rx.recv().await {
            yield Ok::<Event, Infallible>(to_sse(&event));
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Buffer events up to the first model output. An error seen before then fails
/// the request.
async fn read_prelude(rx: &mut mpsc::Receiver<StreamEvent>) -> ApiResult<Vec<StreamEvent>> {
    let mut prelude = Vec::new();

    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Error { message, .. } => return Err(ApiError::Model(message)),
            event if event.is_model_output() => {
                prelude.push(event);
                break;
            }
            StreamEvent::EndStream { .. } => {
                prelude.push(event);
                break;
            }
            event => prelude.push(event),
        }
    }

    Ok(prelude)
}

fn event_name(event: &StreamEvent) -> &'static str {
    match event {
        StreamEvent::InitStream { .. } => "init_stream",
        StreamEvent::Reasoning { .. } => "reasoning",
        StreamEvent::TextDelta { .. } => "text_delta",
        StreamEvent::ToolInputStreaming { .. } => "tool_input_streaming",
        StreamEvent::ToolInputAvailable { .. } => "tool_input_available",
        StreamEvent::ToolOutputAvailable { .. } => "tool_output_available",
        StreamEvent::ToolOutputError { .. } => "tool_output_error",
        StreamEvent::StepFinished { .. } => "step_finished",
        StreamEvent::MessagePersisted { .. } => "message_persisted",
        StreamEvent::Error { .. } => "error",
        StreamEvent::EndStream { .. } => "end_stream",
    }
}

fn to_sse(event: &StreamEvent) -> Event {
    let name = event_name(event);
    Event::default().event(name).json_data(event).unwrap_or_else(|e| {
        tracing::error!(event = name, error = %e, "Failed to serialize stream event");
        Event::default().event("error").data("serialization failed")
    })
}
