use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use studio_llm::ToolCall;
use studio_tools::{ToolError, ToolRegistry};
use studio_types::{GraphState, StreamEvent};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::node::{emit, EventSender, Node, NodeType};

/// Runs every tool call of the last model step.
///
/// Calls run concurrently but results are recorded in request order. A failing
/// or timed-out tool becomes an `output-error` part; the loop carries on.
pub struct ToolNode {
    tools: Arc<ToolRegistry>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl ToolNode {
    pub fn new(tools: Arc<ToolRegistry>, timeout: Duration, cancel: CancellationToken) -> Self {
        Self { tools, timeout, cancel }
    }

    async fn run_one(&self, call: &ToolCall) -> (std::result::Result<Value, ToolError>, u64) {
        let start = Instant::now();
        let name = &call.function.name;

        let result = match self.tools.get(name) {
            None => Err(ToolError::NotFound(name.clone())),
            Some(tool) => match call.arguments_value() {
                Err(e) => Err(ToolError::InvalidInput(format!("arguments are not valid JSON: {}", e))),
                Ok(input) => match tokio::time::timeout(self.timeout, tool.execute(input)).await {
                    Ok(result) => result,
                    Err(_) => Err(ToolError::Timeout(self.timeout.as_secs())),
                },
            },
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(tool = %name, duration_ms, "Tool completed"),
            Err(e) => warn!(tool = %name, duration_ms, error = %e, "Tool failed"),
        }
        (result, duration_ms)
    }
}

#[async_trait]
impl Node for ToolNode {
    async fn execute(&self, state: &mut GraphState, event_tx: EventSender) -> Result<()> {
        let tool_calls = state.get_pending_tool_calls();
        if tool_calls.is_empty() {
            return Ok(());
        }

        if self.cancel.is_cancelled() {
            debug!(skipped = tool_calls.len(), "Turn cancelled before tool dispatch");
            return Ok(());
        }

        for call in &tool_calls {
            state.called_tools.push(call.function.name.clone());
        }

        let outcomes = join_all(tool_calls.iter().map(|call| self.run_one(call))).await;

        for (call, (result, duration_ms)) in tool_calls.into_iter().zip(outcomes) {
            let tool_name = call.function.name;
            match result {
                Ok(output) => {
                    if let Err(e) = state.parts.complete(&call.id, output.clone()) {
                        warn!(error = %e, "Ignoring out-of-order tool state update");
                    }
                    emit(
                        &event_tx,
                        StreamEvent::ToolOutputAvailable {
                            tool_call_id: call.id.clone(),
                            tool_name,
                            output: output.clone(),
                            duration_ms,
                        },
                    )
                    .await;
                    state.add_tool_result(call.id, output.to_string());
                }
                Err(error) => {
                    let error_text = error.to_string();
                    if let Err(e) = state.parts.fail(&call.id, &error_text) {
                        warn!(error = %e, "Ignoring out-of-order tool state update");
                    }
                    emit(
                        &event_tx,
                        StreamEvent::ToolOutputError {
                            tool_call_id: call.id.clone(),
                            tool_name,
                            error_text: error_text.clone(),
                            duration_ms,
                        },
                    )
                    .await;
                    state.add_tool_result(call.id, json!({ "error": error_text }).to_string());
                }
            }
        }

        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Tool
    }
}
