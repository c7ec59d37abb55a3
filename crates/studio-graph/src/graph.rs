use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use chrono_tz::Tz;
use serde_json::json;
use studio_llm::{ChatClient, Message};
use studio_persist::PersistenceClient;
use studio_types::{
    AgentProfile, GraphConfig, GraphState, LLMConfig, NewMessage, StreamEvent, TurnStatus,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::node::{emit, EventSender, Node, NodeType};
use crate::nodes::{LLMNode, ToolNode};
use crate::prompts::{system_prompt, PromptContext};
use crate::router::{NextNode, PolicyRouter, Router};
use crate::toolset::ToolResolver;

/// Everything one turn needs from the caller
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub thread_id: String,
    pub user_id: String,
    /// Conversation history ending with the new user message, without a system prompt
    pub messages: Vec<Message>,
    pub agent: AgentProfile,
    pub llm_config: LLMConfig,
}

/// Runs turns. Cheap to clone; one instance serves every request.
#[derive(Clone)]
pub struct Graph {
    client: Arc<dyn ChatClient>,
    tools: ToolResolver,
    config: GraphConfig,
    timezone: Tz,
    persistence: Option<Arc<dyn PersistenceClient>>,
}

impl Graph {
    pub(crate) fn new(
        client: Arc<dyn ChatClient>,
        tools: ToolResolver,
        config: GraphConfig,
        timezone: Tz,
        persistence: Option<Arc<dyn PersistenceClient>>,
    ) -> Self {
        Self {
            client,
            tools,
            config,
            timezone,
            persistence,
        }
    }

    pub fn builder() -> crate::builder::GraphBuilder {
        crate::builder::GraphBuilder::new()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Spawn a turn in the background and return its event receiver.
    ///
    /// The turn always ends with `EndStream`. Cancelling the token stops it at
    /// the next await point; whatever was assembled so far is still persisted.
    pub fn spawn_run(&self, input: TurnInput, cancel: CancellationToken) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(1000);
        let graph = self.clone();

        tokio::spawn(async move {
            graph.run_turn(input, tx, cancel).await;
        });

        rx
    }

    async fn run_turn(&self, input: TurnInput, event_tx: EventSender, cancel: CancellationToken) {
        let start = Instant::now();
        let TurnInput {
            thread_id,
            user_id,
            messages,
            agent,
            llm_config,
        } = input;

        let registry = Arc::new(self.tools.resolve(&agent, &user_id).await);
        let ctx = PromptContext::new(Utc::now(), self.timezone, registry.connector_count());

        let mut history = Vec::with_capacity(messages.len() + 1);
        history.push(Message::system(system_prompt(&agent, &ctx)));
        history.extend(messages);

        let mut state = GraphState::new(thread_id, user_id, history, llm_config);
        info!(
            run_id = %state.run_id,
            thread_id = %state.thread_id,
            agent = %agent.id,
            tools = registry.len(),
            "Starting turn"
        );

        emit(
            &event_tx,
            StreamEvent::InitStream {
                run_id: state.run_id.clone(),
                thread_id: state.thread_id.clone(),
                timestamp: Utc::now().timestamp_millis(),
            },
        )
        .await;

        let llm_node = LLMNode::new(
            Arc::clone(&self.client),
            Arc::clone(&registry),
            self.config.stream_idle_timeout,
            cancel.clone(),
        );
        let tool_node = ToolNode::new(registry, self.config.tool_timeout, cancel.clone());
        let router = PolicyRouter::new(agent.stop_policy.clone());

        let status = self
            .drive(&mut state, &llm_node, &tool_node, &router, &event_tx, &cancel)
            .await;

        self.persist(&state, &agent, status, &event_tx).await;

        let total_duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %state.run_id,
            steps = state.steps,
            status = ?status,
            duration_ms = total_duration_ms,
            "Turn finished"
        );
        emit(&event_tx, StreamEvent::EndStream { status, total_duration_ms }).await;
    }

    async fn drive(
        &self,
        state: &mut GraphState,
        llm_node: &LLMNode,
        tool_node: &ToolNode,
        router: &dyn Router,
        event_tx: &EventSender,
        cancel: &CancellationToken,
    ) -> TurnStatus {
        let mut current = NodeType::LLM;
        let mut iteration = 0;

        loop {
            if cancel.is_cancelled() {
                return TurnStatus::Cancelled;
            }

            // Guardrail independent of the agent's stop policy
            if iteration >= self.config.max_iterations {
                warn!(run_id = %state.run_id, max = self.config.max_iterations, "Iteration limit reached");
                emit(
                    event_tx,
                    StreamEvent::Error {
                        message: format!("Max iterations ({}) reached", self.config.max_iterations),
                        node_id: None,
                    },
                )
                .await;
                return TurnStatus::Error;
            }
            iteration += 1;

            let node: &dyn Node = match current {
                NodeType::LLM => llm_node,
                NodeType::Tool => tool_node,
            };

            if let Err(e) = node.execute(state, event_tx.clone()).await {
                error!(run_id = %state.run_id, node = ?current, error = %e, "Node failed");
                emit(
                    event_tx,
                    StreamEvent::Error {
                        message: format!("{:#}", e),
                        node_id: Some(node_id(current).to_string()),
                    },
                )
                .await;
                return TurnStatus::Error;
            }

            if cancel.is_cancelled() {
                return TurnStatus::Cancelled;
            }

            current = match router.next(state, current) {
                NextNode::LLM => NodeType::LLM,
                NextNode::Tool => NodeType::Tool,
                NextNode::End => return TurnStatus::Completed,
            };
        }
    }

    /// Store the assembled assistant message. Failures are logged; the caller
    /// has already seen the streamed answer.
    async fn persist(&self, state: &GraphState, agent: &AgentProfile, status: TurnStatus, event_tx: &EventSender) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        if state.parts.is_empty() {
            return;
        }

        let metadata = json!({
            "runId": state.run_id,
            "agentId": agent.id,
            "model": state.llm_config.model,
            "status": status,
            "steps": state.steps,
        });
        let message = NewMessage::assistant(state.thread_id.clone(), state.parts.to_parts()).with_metadata(metadata);

        match persistence.create_message(message).await {
            Ok(stored) => {
                emit(event_tx, StreamEvent::MessagePersisted { message_id: stored.id }).await;
                if let Err(e) = persistence.touch_thread(&state.thread_id).await {
                    warn!(thread_id = %state.thread_id, error = %e, "Failed to touch thread");
                }
            }
            Err(e) => {
                error!(thread_id = %state.thread_id, error = %e, "Failed to persist assistant message");
            }
        }
    }
}

fn node_id(node: NodeType) -> &'static str {
    match node {
        NodeType::LLM => "llm",
        NodeType::Tool => "tool",
    }
}
