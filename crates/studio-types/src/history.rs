use serde_json::json;
use studio_llm::{Message, ToolCall};

use crate::message::{ChatMessage, Role};
use crate::part::{ToolPart, ToolState};

/// Replay stored messages as model input.
///
/// An assistant message expands to one tool-calling turn plus its tool results,
/// followed by its text. Tool parts that never reached a terminal state are
/// dropped since the provider requires a result for every call.
pub fn to_llm_messages(history: &[ChatMessage]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len());

    for stored in history {
        match stored.role {
            Role::User => messages.push(Message::human(stored.text_content())),
            Role::Assistant => push_assistant(&mut messages, stored),
        }
    }

    messages
}

fn push_assistant(messages: &mut Vec<Message>, stored: &ChatMessage) {
    let finished: Vec<&ToolPart> = stored
        .parts
        .iter()
        .filter_map(|p| p.as_tool())
        .filter(|t| t.state.is_terminal())
        .collect();

    if !finished.is_empty() {
        let calls = finished
            .iter()
            .map(|t| ToolCall::new(&t.tool_call_id, &t.tool_name, t.input.to_string()))
            .collect();
        messages.push(Message::ai_with_tools(calls));

        for tool in finished {
            messages.push(Message::tool_result(&tool.tool_call_id, tool_result_text(tool)));
        }
    }

    let text = stored.text_content();
    if !text.is_empty() {
        messages.push(Message::ai(text));
    }
}

fn tool_result_text(tool: &ToolPart) -> String {
    match tool.state {
        ToolState::OutputError => json!({
            "error": tool.error_text.clone().unwrap_or_default()
        })
        .to_string(),
        _ => tool
            .output
            .as_ref()
            .map(|o| o.to_string())
            .unwrap_or_else(|| "null".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::NewMessage;
    use crate::part::Part;
    use chrono::Utc;

    #[test]
    fn test_replay_assistant_with_tools() {
        let mut search = ToolPart::streaming("c1", "smartSearch");
        search.input_available(json!({"query": "roma"})).unwrap();
        search.complete(json!({"answer": "ok"})).unwrap();
        let mut dangling = ToolPart::streaming("c2", "smartSearch");
        dangling.input_available(json!({})).unwrap();

        let history = vec![
            NewMessage::user("t", "cerca roma").into_message("m1", Utc::now()),
            NewMessage::assistant("t", vec![Part::Tool(search), Part::Tool(dangling), Part::text("Ecco.")])
                .into_message("m2", Utc::now()),
        ];

        let messages = to_llm_messages(&history);
        let roles: Vec<&str> = messages.iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec!["user", "assistant", "tool", "assistant"]);

        match &messages[1] {
            Message::AI { tool_calls: Some(calls), .. } => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].function.name, "smartSearch");
                assert_eq!(calls[0].arguments_value().unwrap(), json!({"query": "roma"}));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_error_part_replayed_as_error_payload() {
        let mut part = ToolPart::streaming("c1", "GMAIL_SEND_EMAIL");
        part.fail("unauthorized").unwrap();
        let history = vec![NewMessage::assistant("t", vec![Part::Tool(part)]).into_message("m", Utc::now())];

        let messages = to_llm_messages(&history);
        assert_eq!(messages.len(), 2);
        match &messages[1] {
            Message::Tool { content, .. } => {
                assert_eq!(content.to_text(), r#"{"error":"unauthorized"}"#);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }
}
