use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const TOOL_PREFIX: &str = "tool-";

/// Lifecycle of a tool call inside an assistant message.
///
/// States only move forward: `input-streaming` → `input-available` →
/// `output-available` | `output-error`. The two output states are both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    InputStreaming,
    InputAvailable,
    OutputAvailable,
    OutputError,
}

impl ToolState {
    pub fn rank(self) -> u8 {
        match self {
            ToolState::InputStreaming => 0,
            ToolState::InputAvailable => 1,
            ToolState::OutputAvailable | ToolState::OutputError => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    pub fn can_advance_to(self, next: ToolState) -> bool {
        next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToolState::InputStreaming => "input-streaming",
            ToolState::InputAvailable => "input-available",
            ToolState::OutputAvailable => "output-available",
            ToolState::OutputError => "output-error",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("tool call {tool_call_id}: cannot move from {from} to {to}")]
pub struct StateTransitionError {
    pub tool_call_id: String,
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawPart", try_from = "RawPart")]
pub enum Part {
    Text(TextPart),
    Tool(ToolPart),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolPart {
    pub tool_name: String,
    pub tool_call_id: String,
    pub state: ToolState,
    pub input: Value,
    pub output: Option<Value>,
    pub error_text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(TextPart { text: text.into() })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(p) => Some(&p.text),
            Part::Tool(_) => None,
        }
    }

    pub fn as_tool(&self) -> Option<&ToolPart> {
        match self {
            Part::Tool(p) => Some(p),
            Part::Text(_) => None,
        }
    }

    /// Wire tag: `text` or `tool-<name>`
    pub fn type_tag(&self) -> String {
        match self {
            Part::Text(_) => "text".to_string(),
            Part::Tool(p) => format!("{}{}", TOOL_PREFIX, p.tool_name),
        }
    }
}

impl ToolPart {
    pub fn streaming(tool_call_id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_call_id: tool_call_id.into(),
            state: ToolState::InputStreaming,
            input: Value::Null,
            output: None,
            error_text: None,
        }
    }

    fn advance(&mut self, next: ToolState) -> Result<(), StateTransitionError> {
        if !self.state.can_advance_to(next) {
            return Err(StateTransitionError {
                tool_call_id: self.tool_call_id.clone(),
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        self.state = next;
        Ok(())
    }

    pub fn input_available(&mut self, input: Value) -> Result<(), StateTransitionError> {
        self.advance(ToolState::InputAvailable)?;
        self.input = input;
        Ok(())
    }

    pub fn complete(&mut self, output: Value) -> Result<(), StateTransitionError> {
        self.advance(ToolState::OutputAvailable)?;
        self.output = Some(output);
        Ok(())
    }

    pub fn fail(&mut self, error_text: impl Into<String>) -> Result<(), StateTransitionError> {
        self.advance(ToolState::OutputError)?;
        self.error_text = Some(error_text.into());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPart {
    #[serde(rename = "type")]
    part_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<ToolState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_text: Option<String>,
}

impl From<Part> for RawPart {
    fn from(part: Part) -> Self {
        let part_type = part.type_tag();
        match part {
            Part::Text(p) => RawPart {
                part_type,
                text: Some(p.text),
                tool_call_id: None,
                state: None,
                input: None,
                output: None,
                error_text: None,
            },
            Part::Tool(p) => RawPart {
                part_type,
                text: None,
                tool_call_id: Some(p.tool_call_id),
                state: Some(p.state),
                input: Some(p.input),
                output: p.output,
                error_text: p.error_text,
            },
        }
    }
}

impl TryFrom<RawPart> for Part {
    type Error = String;

    fn try_from(raw: RawPart) -> Result<Self, Self::Error> {
        if raw.part_type == "text" {
            return Ok(Part::text(raw.text.unwrap_or_default()));
        }

        let tool_name = raw
            .part_type
            .strip_prefix(TOOL_PREFIX)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| format!("unknown part type `{}`", raw.part_type))?;

        Ok(Part::Tool(ToolPart {
            tool_name: tool_name.to_string(),
            tool_call_id: raw.tool_call_id.unwrap_or_default(),
            state: raw.state.unwrap_or(ToolState::InputAvailable),
            input: raw.input.unwrap_or(Value::Null),
            output: raw.output,
            error_text: raw.error_text,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_part_wire_shape() {
        let json = serde_json::to_value(Part::text("a")).unwrap();
        assert_eq!(json, json!({"type": "text", "text": "a"}));
    }

    #[test]
    fn test_tool_part_wire_shape() {
        let mut part = ToolPart::streaming("call_1", "smartSearch");
        part.input_available(json!({"query": "meteo"})).unwrap();
        part.complete(json!({"answer": "sole"})).unwrap();

        let json = serde_json::to_value(Part::Tool(part)).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "tool-smartSearch",
                "toolCallId": "call_1",
                "state": "output-available",
                "input": {"query": "meteo"},
                "output": {"answer": "sole"}
            })
        );
    }

    #[test]
    fn test_connector_tool_name_with_underscores() {
        let part: Part = serde_json::from_value(json!({
            "type": "tool-GMAIL_SEND_EMAIL",
            "toolCallId": "c",
            "state": "output-error",
            "input": {},
            "errorText": "boom"
        }))
        .unwrap();

        let tool = part.as_tool().unwrap();
        assert_eq!(tool.tool_name, "GMAIL_SEND_EMAIL");
        assert_eq!(tool.state, ToolState::OutputError);
        assert_eq!(tool.error_text.as_deref(), Some("boom"));
    }

    #[test]
    fn test_unknown_part_type_rejected() {
        let result: Result<Part, _> = serde_json::from_value(json!({"type": "image"}));
        assert!(result.is_err());
        let result: Result<Part, _> = serde_json::from_value(json!({"type": "tool-"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_state_never_regresses() {
        let mut part = ToolPart::streaming("call_1", "smartSearch");
        part.input_available(json!({})).unwrap();
        part.complete(json!({})).unwrap();

        assert!(part.input_available(json!({})).is_err());
        assert!(part.fail("late").is_err());
        assert_eq!(part.state, ToolState::OutputAvailable);
        assert!(part.error_text.is_none());
    }

    #[test]
    fn test_skip_straight_to_error() {
        let mut part = ToolPart::streaming("call_1", "taskPlanning");
        part.fail("invalid arguments").unwrap();
        assert!(part.state.is_terminal());
    }

    #[test]
    fn test_state_ranks() {
        assert!(ToolState::InputStreaming.can_advance_to(ToolState::InputAvailable));
        assert!(ToolState::InputAvailable.can_advance_to(ToolState::OutputError));
        assert!(!ToolState::OutputError.can_advance_to(ToolState::OutputAvailable));
        assert!(!ToolState::InputAvailable.can_advance_to(ToolState::InputAvailable));
    }
}
