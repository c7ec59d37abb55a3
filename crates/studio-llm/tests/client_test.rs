use futures::StreamExt;
use serde_json::json;
use studio_llm::{ChatClient, ChatOptions, ChatRequest, Message, OpenAIClient, ResponseFormat, StreamEvent};

#[tokio::test]
async fn test_chat_structured_output() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "gen-1",
                "model": "openai/gpt-4.1-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "{\"tasks\":[]}"},
                    "finish_reason": "stop"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key").unwrap().with_base_url(server.url());
    let request = ChatRequest::new("openai/gpt-4.1-mini", vec![Message::human("plan")])
        .with_options(ChatOptions::new().response_format(ResponseFormat::json_schema("plan", json!({}))));

    let response = client.chat(request).await.unwrap();
    let parsed: serde_json::Value = response.parse_json().unwrap();

    assert_eq!(parsed, json!({"tasks": []}));
    assert!(response.usage.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;

    let client = OpenAIClient::new("k").unwrap().with_base_url(server.url());
    let err = client
        .chat(ChatRequest::new("m", vec![Message::human("hi")]))
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("429"));
    assert!(err.contains("slow down"));
}

#[tokio::test]
async fn test_chat_stream_over_http() {
    let mut server = mockito::Server::new_async().await;
    let body = concat!(
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Ciao\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let client = OpenAIClient::new("k").unwrap().with_base_url(server.url());
    let stream = client
        .chat_stream(ChatRequest::new("m", vec![Message::human("hi")]))
        .await
        .unwrap();
    let events: Vec<StreamEvent> = stream.map(|e| e.unwrap()).collect().await;

    assert_eq!(events[0], StreamEvent::Message { content: "Ciao".to_string() });
    assert!(matches!(events.last(), Some(StreamEvent::Done { .. })));
}
