use anyhow::Result;
use async_trait::async_trait;
use studio_types::{GraphState, StreamEvent};
use tokio::sync::mpsc;

pub type EventSender = mpsc::Sender<StreamEvent>;

/// Core abstraction for a unit of computation in the graph
#[async_trait]
pub trait Node: Send + Sync {
    /// Execute the node's logic, potentially modifying state and emitting events
    async fn execute(&self, state: &mut GraphState, event_tx: EventSender) -> Result<()>;

    fn node_type(&self) -> NodeType;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    LLM,
    Tool,
}

/// Send an event. A dropped receiver means the caller went away; the turn
/// keeps going so its result can still be persisted.
pub(crate) async fn emit(event_tx: &EventSender, event: StreamEvent) {
    if event_tx.send(event).await.is_err() {
        tracing::trace!("Event receiver dropped");
    }
}
