use futures::StreamExt;
use studio_llm::buffer_utils::parse_sse_bytes;
use studio_llm::{ChatChunkParser, SseLineParser, StreamEvent};

fn chunks(parts: &[&str]) -> impl futures::Stream<Item = Result<Vec<u8>, std::io::Error>> {
    let owned: Vec<Result<Vec<u8>, std::io::Error>> =
        parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
    futures::stream::iter(owned)
}

async fn collect(parts: &[&str]) -> Vec<anyhow::Result<StreamEvent>> {
    parse_sse_bytes(chunks(parts), ChatChunkParser).collect().await
}

#[test]
fn test_stream_event_serialization_message() {
    let event = StreamEvent::Message {
        content: "Test".to_string(),
    };

    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"type\":\"message\""));
    assert!(json.contains("Test"));
}

#[test]
fn test_parser_text_delta() {
    let events = ChatChunkParser
        .parse_data_line(r#"{"id":"1","choices":[{"index":0,"delta":{"content":"Ciao"},"finish_reason":null}]}"#)
        .unwrap();
    assert_eq!(events, vec![StreamEvent::Message { content: "Ciao".to_string() }]);
}

#[test]
fn test_parser_tool_call_delta() {
    let data = r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_1","type":"function","function":{"name":"smartSearch","arguments":""}}]},"finish_reason":null}]}"#;
    let events = ChatChunkParser.parse_data_line(data).unwrap();
    assert_eq!(
        events,
        vec![StreamEvent::ToolCall {
            index: 0,
            id: Some("call_1".to_string()),
            name: Some("smartSearch".to_string()),
            arguments: Some(String::new()),
        }]
    );
}

#[test]
fn test_parser_in_band_error() {
    let result = ChatChunkParser.parse_data_line(r#"{"error":{"message":"rate limited"}}"#);
    let err = result.unwrap_err().to_string();
    assert!(err.contains("rate limited"));
}

#[tokio::test]
async fn test_stream_split_across_chunks() {
    let events = collect(&[
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"con",
        "tent\":\"Hel\"},\"finish_reason\":null}]}\n\n",
        ": keep-alive\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    ])
    .await;

    let events: Vec<StreamEvent> = events.into_iter().map(|e| e.unwrap()).collect();
    assert_eq!(
        events,
        vec![
            StreamEvent::Message { content: "Hel".to_string() },
            StreamEvent::Message { content: "lo".to_string() },
            StreamEvent::Done { finish_reason: Some("stop".to_string()) },
            StreamEvent::Done { finish_reason: None },
        ]
    );
}

#[tokio::test]
async fn test_stream_stops_at_done_marker() {
    let events = collect(&[
        "data: [DONE]\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"late\"},\"finish_reason\":null}]}\n",
    ])
    .await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_stream_trailing_line_without_newline() {
    let events = collect(&[
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"tail\"},\"finish_reason\":null}]}",
    ])
    .await;
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].as_ref().unwrap(),
        &StreamEvent::Message { content: "tail".to_string() }
    );
}

#[tokio::test]
async fn test_stream_reports_malformed_chunk() {
    let events = collect(&["data: {not json}\n"]).await;
    assert_eq!(events.len(), 1);
    assert!(events[0].is_err());
}
