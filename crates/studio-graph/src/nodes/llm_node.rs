use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use studio_llm::{ChatClient, ChatOptions, ChatRequest, Message, ToolCall, ToolChoice};
use studio_tools::ToolRegistry;
use studio_types::{GraphState, StreamEvent};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::node::{emit, EventSender, Node, NodeType};

/// Tool call being assembled from stream fragments
#[derive(Default)]
struct PendingCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
    announced: bool,
}

struct StepOutput {
    text: String,
    tool_calls: Vec<ToolCall>,
    finish_reason: Option<String>,
    cancelled: bool,
}

/// One model step: stream the completion, forward deltas, record text and
/// tool-call parts, and append the assistant message to the state.
pub struct LLMNode {
    client: Arc<dyn ChatClient>,
    tools: Arc<ToolRegistry>,
    idle_timeout: Duration,
    cancel: CancellationToken,
}

impl LLMNode {
    pub fn new(
        client: Arc<dyn ChatClient>,
        tools: Arc<ToolRegistry>,
        idle_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            tools,
            idle_timeout,
            cancel,
        }
    }

    fn build_request(&self, state: &GraphState) -> ChatRequest {
        let mut options = ChatOptions::new();
        if !self.tools.is_empty() {
            options = options.tools(self.tools.llm_tools()).tool_choice(ToolChoice::auto());
        }
        if let Some(temp) = state.llm_config.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = state.llm_config.max_tokens {
            options = options.max_tokens(max_tokens);
        }

        ChatRequest::new(state.llm_config.model.clone(), state.messages.clone()).with_options(options)
    }

    async fn process_stream(
        &self,
        mut stream: studio_llm::EventStream,
        state: &mut GraphState,
        event_tx: &EventSender,
    ) -> Result<StepOutput> {
        let step = state.steps;
        let mut text = String::new();
        let mut finish_reason = None;
        let mut pending: BTreeMap<u32, PendingCall> = BTreeMap::new();
        let mut cancelled = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = tokio::time::timeout(self.idle_timeout, stream.next()) => next,
            };

            let event = match next {
                Err(_) => bail!("Model stream idle for more than {}s", self.idle_timeout.as_secs()),
                Ok(None) => break,
                Ok(Some(event)) => event.context("Model stream failed")?,
            };

            match event {
                studio_llm::StreamEvent::Reasoning { content } => {
                    emit(event_tx, StreamEvent::Reasoning { content }).await;
                }
                studio_llm::StreamEvent::Message { content } => {
                    text.push_str(&content);
                    state.parts.push_text(step, &content);
                    emit(event_tx, StreamEvent::TextDelta { content }).await;
                }
                studio_llm::StreamEvent::ToolCall { index, id, name, arguments } => {
                    let call = pending.entry(index).or_default();
                    if let Some(id) = id {
                        call.id = Some(id);
                    }
                    if let Some(name) = name {
                        call.name = Some(name);
                    }
                    if let Some(args) = arguments {
                        call.arguments.push_str(&args);
                    }
                    if let (false, Some(id), Some(name)) = (call.announced, &call.id, &call.name) {
                        call.announced = true;
                        state.parts.start_tool(id, name);
                        emit(
                            event_tx,
                            StreamEvent::ToolInputStreaming {
                                tool_call_id: id.clone(),
                                tool_name: name.clone(),
                            },
                        )
                        .await;
                    }
                }
                studio_llm::StreamEvent::Done { finish_reason: reason } => {
                    finish_reason = reason;
                }
            }
        }

        let tool_calls = pending
            .into_values()
            .filter_map(|call| match (call.id, call.name) {
                (Some(id), Some(name)) => Some(ToolCall::new(id, name, call.arguments)),
                _ => None,
            })
            .collect();

        Ok(StepOutput {
            text,
            tool_calls,
            finish_reason,
            cancelled,
        })
    }

    async fn announce_inputs(&self, state: &mut GraphState, calls: &[ToolCall], event_tx: &EventSender) {
        for call in calls {
            let input = call
                .arguments_value()
                .unwrap_or_else(|_| Value::String(call.function.arguments.clone()));
            if let Err(e) = state.parts.set_input(&call.id, &call.function.name, input.clone()) {
                warn!(error = %e, "Ignoring out-of-order tool state update");
            }
            emit(
                event_tx,
                StreamEvent::ToolInputAvailable {
                    tool_call_id: call.id.clone(),
                    tool_name: call.function.name.clone(),
                    input,
                },
            )
            .await;
        }
    }
}

#[async_trait]
impl Node for LLMNode {
    async fn execute(&self, state: &mut GraphState, event_tx: EventSender) -> Result<()> {
        let request = self.build_request(state);
        info!(
            model = %request.model,
            step = state.steps + 1,
            tools = self.tools.len(),
            "Requesting model step"
        );

        let stream = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(()),
            stream = self.client.chat_stream(request) => stream.context("Failed to open model stream")?,
        };

        let output = self.process_stream(stream, state, &event_tx).await?;
        state.steps += 1;

        // Calls cut off by cancellation are never dispatched
        let tool_calls = if output.cancelled {
            debug!(dropped = output.tool_calls.len(), "Step cancelled mid-stream");
            Vec::new()
        } else {
            output.tool_calls
        };

        self.announce_inputs(state, &tool_calls, &event_tx).await;
        state.add_message(Message::ai_with_content_and_tools(Some(output.text), tool_calls));

        emit(
            &event_tx,
            StreamEvent::StepFinished {
                step: state.steps,
                finish_reason: output.finish_reason,
            },
        )
        .await;

        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::LLM
    }
}
