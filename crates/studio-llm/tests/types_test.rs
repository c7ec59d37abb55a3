use serde_json::json;
use studio_llm::{Content, Message, Tool, ToolCall, ToolChoice};

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("s").role(), "system");
    assert_eq!(Message::human("h").role(), "user");
    assert_eq!(Message::ai("a").role(), "assistant");
    assert_eq!(Message::tool_result("call_1", "r").role(), "tool");
}

#[test]
fn test_human_message_serialization() {
    let json = serde_json::to_value(Message::human("ciao")).unwrap();
    assert_eq!(json, json!({"role": "user", "content": "ciao"}));
}

#[test]
fn test_ai_with_content_and_tools_drops_empty_parts() {
    let msg = Message::ai_with_content_and_tools(Some(String::new()), vec![]);
    match msg {
        Message::AI { content, tool_calls, .. } => {
            assert!(content.is_none());
            assert!(tool_calls.is_none());
        }
        _ => panic!("Expected AI variant"),
    }
}

#[test]
fn test_tool_definition() {
    let tool = Tool::new(
        "smartSearch",
        "Search the web",
        json!({"type": "object", "properties": {"query": {"type": "string"}}}),
    );
    assert_eq!(tool.name(), "smartSearch");
    assert_eq!(tool.tool_type, "function");

    let json = serde_json::to_value(&tool).unwrap();
    assert_eq!(json["function"]["description"], "Search the web");
    assert!(json["function"].get("parameters").is_some());
}

#[test]
fn test_tool_call_arguments() {
    let call = ToolCall::new("call_1", "smartSearch", r#"{"query":"meteo roma"}"#);
    let args = call.arguments_value().unwrap();
    assert_eq!(args["query"], "meteo roma");

    let empty = ToolCall::new("call_2", "taskCompleted", "");
    assert_eq!(empty.arguments_value().unwrap(), json!({}));

    let broken = ToolCall::new("call_3", "smartSearch", "{\"query\":");
    assert!(broken.arguments_value().is_err());
}

#[test]
fn test_tool_choice_serialization() {
    assert_eq!(serde_json::to_value(ToolChoice::auto()).unwrap(), json!("auto"));
    assert_eq!(ToolChoice::default(), ToolChoice::Auto);
}

#[test]
fn test_content_is_a_plain_string() {
    let content = Content::text("ciao");
    assert_eq!(serde_json::to_value(&content).unwrap(), json!("ciao"));
    assert_eq!(content.as_str(), "ciao");
    assert!(Content::default().is_empty());

    let back: Content = serde_json::from_value(json!("roma")).unwrap();
    assert_eq!(back, Content::from("roma"));
    assert!(serde_json::from_value::<Content>(json!([{"type": "text", "text": "a"}])).is_err());
}

#[test]
fn test_tool_result_serialization() {
    let json = serde_json::to_value(Message::tool_result("call_1", "ok")).unwrap();
    assert_eq!(json, json!({"role": "tool", "tool_call_id": "call_1", "content": "ok"}));
}
