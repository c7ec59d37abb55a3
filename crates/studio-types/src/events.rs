use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events emitted over the course of one turn, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    InitStream {
        run_id: String,
        thread_id: String,
        timestamp: i64,
    },

    /// Reasoning text from models that expose it. Shown live, never persisted.
    Reasoning {
        content: String,
    },

    TextDelta {
        content: String,
    },

    ToolInputStreaming {
        tool_call_id: String,
        tool_name: String,
    },

    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        input: Value,
    },

    ToolOutputAvailable {
        tool_call_id: String,
        tool_name: String,
        output: Value,
        duration_ms: u64,
    },

    ToolOutputError {
        tool_call_id: String,
        tool_name: String,
        error_text: String,
        duration_ms: u64,
    },

    StepFinished {
        step: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },

    MessagePersisted {
        message_id: String,
    },

    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },

    EndStream {
        status: TurnStatus,
        total_duration_ms: u64,
    },
}

impl StreamEvent {
    /// True once the model has produced something the caller can see.
    pub fn is_model_output(&self) -> bool {
        matches!(
            self,
            StreamEvent::Reasoning { .. }
                | StreamEvent::TextDelta { .. }
                | StreamEvent::ToolInputStreaming { .. }
                | StreamEvent::ToolInputAvailable { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Completed,
    Cancelled,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_tagging() {
        let event = StreamEvent::ToolOutputError {
            tool_call_id: "c1".to_string(),
            tool_name: "smartSearch".to_string(),
            error_text: "timed out".to_string(),
            duration_ms: 30_000,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "tool_output_error");
        assert_eq!(value["error_text"], "timed out");

        let end = serde_json::to_value(StreamEvent::EndStream {
            status: TurnStatus::Cancelled,
            total_duration_ms: 3,
        })
        .unwrap();
        assert_eq!(end, json!({"type": "end_stream", "status": "cancelled", "total_duration_ms": 3}));
    }

    #[test]
    fn test_model_output_detection() {
        assert!(StreamEvent::TextDelta { content: "x".into() }.is_model_output());
        assert!(!StreamEvent::Error { message: "x".into(), node_id: None }.is_model_output());
        assert!(!StreamEvent::StepFinished { step: 1, finish_reason: None }.is_model_output());
    }
}
