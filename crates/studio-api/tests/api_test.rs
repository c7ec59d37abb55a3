use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use futures::stream;
use serde_json::{json, Value};
use tower::ServiceExt;

use studio_api::{
    auth::{AuthenticatedUser, Authenticator},
    build_router,
    config::Config,
    state::AppState,
};
use studio_connect::{
    ConnectorApp, ConnectorError, ConnectorProvider, ConnectorService, RemoteTool,
};
use studio_graph::{Graph, ToolResolver};
use studio_llm::{ChatClient, ChatRequest, ChatResponse, EventStream};
use studio_persist::{MemoryPersistenceClient, PersistenceClient};
use studio_types::{Connection, ConnectionStatus, Role};

/// Accepts `alice-token` and `bob-token`
struct FakeAuthenticator;

#[async_trait]
impl Authenticator for FakeAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Option<AuthenticatedUser>> {
        let id = match token {
            "alice-token" => "alice",
            "bob-token" => "bob",
            _ => return Ok(None),
        };
        Ok(Some(AuthenticatedUser {
            id: id.to_string(),
            email: None,
        }))
    }
}

/// Answers every turn with a fixed text, or fails to open the stream
struct FakeChat {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeChat {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        Err(anyhow!("not used"))
    }

    async fn chat_stream(&self, _request: ChatRequest) -> Result<EventStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("Chat API error (503): overloaded"));
        }
        let events = vec![
            studio_llm::StreamEvent::Message {
                content: "Ciao ".to_string(),
            },
            studio_llm::StreamEvent::Message {
                content: "Alice".to_string(),
            },
            studio_llm::StreamEvent::Done {
                finish_reason: Some("stop".to_string()),
            },
        ];
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }
}

struct FakeConnectors;

#[async_trait]
impl ConnectorProvider for FakeConnectors {
    async fn list_apps(&self) -> Result<Vec<ConnectorApp>, ConnectorError> {
        Err(ConnectorError::Config("offline".to_string()))
    }

    async fn authorize(&self, user_id: &str, app_id: &str) -> Result<String, ConnectorError> {
        Ok(format!("https://auth.example.com/{}/{}", app_id, user_id))
    }

    async fn list_connections(&self, user_id: &str) -> Result<Vec<Connection>, ConnectorError> {
        Ok(vec![Connection {
            id: format!("conn_{}", user_id),
            user_id: user_id.to_string(),
            app_id: "gmail".to_string(),
            app_name: "Gmail".to_string(),
            app_icon: None,
            status: ConnectionStatus::Active,
            permissions: vec![],
            created_at: chrono::Utc::now(),
        }])
    }

    async fn get_tools(&self, _user_id: &str, _apps: &[String]) -> Result<Vec<RemoteTool>, ConnectorError> {
        Ok(vec![RemoteTool {
            name: "GMAIL_SEND_EMAIL".to_string(),
            description: "Send an email".to_string(),
            parameters: json!({"type": "object"}),
            app_id: "gmail".to_string(),
        }])
    }

    async fn execute_tool(&self, _user_id: &str, _name: &str, _input: Value) -> Result<Value, ConnectorError> {
        Ok(json!({}))
    }

    async fn revoke(&self, _connection_id: &str) -> Result<(), ConnectorError> {
        Ok(())
    }
}

struct TestApp {
    router: Router,
    persistence: Arc<MemoryPersistenceClient>,
    chat: Arc<FakeChat>,
}

fn app_with(chat: Arc<FakeChat>, connectors: bool) -> TestApp {
    let persistence = Arc::new(MemoryPersistenceClient::new());
    let graph = Graph::builder()
        .llm_client(chat.clone())
        .tools(ToolResolver::default())
        .with_persistence(persistence.clone())
        .build()
        .unwrap();

    let mut state = AppState::new(Config::default(), persistence.clone(), graph, Arc::new(FakeAuthenticator));
    if connectors {
        state = state.with_connectors(ConnectorService::new(Arc::new(FakeConnectors)));
    }

    TestApp {
        router: build_router(Arc::new(state)),
        persistence,
        chat,
    }
}

fn app() -> TestApp {
    app_with(FakeChat::new(false), false)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn raw_request(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: &Router, req: Request<Body>) -> Response {
    router.clone().oneshot(req).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn chat_body(thread_id: &str, text: &str) -> Value {
    json!({
        "threadId": thread_id,
        "messages": [{"role": "user", "content": text}]
    })
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let response = send(&app.router, request("GET", "/health", None, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["persistence"], "memory");
    assert_eq!(body["services"]["connectors"], "disabled");
}

#[tokio::test]
async fn test_chat_requires_auth() {
    let app = app();

    for token in [None, Some("forged")] {
        let response = send(&app.router, request("POST", "/chat", token, Some(chat_body("t1", "ciao")))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    assert_eq!(app.chat.calls.load(Ordering::SeqCst), 0);
    assert_eq!(app.persistence.message_count().await, 0);
    assert!(app.persistence.get_thread("t1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_chat_validation() {
    let app = app();

    let missing_thread = json!({"messages": [{"role": "user", "content": "ciao"}]});
    let response = send(&app.router, request("POST", "/chat", Some("alice-token"), Some(missing_thread))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let no_user_message = json!({"threadId": "t1", "messages": [{"role": "assistant", "content": "hi"}]});
    let response = send(&app.router, request("POST", "/chat", Some("alice-token"), Some(no_user_message))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.chat.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_body_is_generic_500() {
    let app = app();
    let expected = json!({"success": false, "error": "Errore interno del server"});

    for body in ["{not json", r#"{"threadId":"t1","messages":"oops"}"#] {
        let response = send(&app.router, raw_request("/chat", "alice-token", body)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, expected);
    }

    let response = send(&app.router, raw_request("/threads", "alice-token", r#"{"id": 7}"#)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, expected);

    let response = send(&app.router, raw_request("/composio/connect", "alice-token", "[")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(app.chat.calls.load(Ordering::SeqCst), 0);
    assert!(app.persistence.get_thread("t1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_chat_streams_and_persists() {
    let app = app();
    let response = send(
        &app.router,
        request("POST", "/chat", Some("alice-token"), Some(chat_body("t1", "ciao"))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = body_text(response).await;
    assert!(body.contains("event: init_stream"));
    assert!(body.contains("event: text_delta"));
    assert!(body.contains("event: message_persisted"));
    assert!(body.contains("event: end_stream"));
    assert!(body.contains(r#""status":"completed""#));

    let thread = app.persistence.get_thread("t1").await.unwrap().unwrap();
    assert_eq!(thread.user_id, "alice");
    assert_eq!(thread.title, "ciao");
    assert_eq!(thread.agent_id, "studio");

    let messages = app.persistence.get_messages("t1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Ciao Alice");
}

#[tokio::test]
async fn test_chat_on_foreign_thread_is_not_found() {
    let app = app();
    send(&app.router, request("POST", "/chat", Some("alice-token"), Some(chat_body("t1", "ciao")))).await;

    let response = send(&app.router, request("POST", "/chat", Some("bob-token"), Some(chat_body("t1", "ehi")))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.chat.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_chat_model_failure_is_500() {
    let app = app_with(FakeChat::new(true), false);
    let response = send(
        &app.router,
        request("POST", "/chat", Some("alice-token"), Some(chat_body("t1", "ciao"))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body, json!({"success": false, "error": "Errore interno del server"}));
}

#[tokio::test]
async fn test_thread_lifecycle() {
    let app = app();
    let token = Some("alice-token");

    let response = send(
        &app.router,
        request(
            "POST",
            "/threads",
            token,
            Some(json!({"id": "t1", "firstMessage": "Quali sono le ultime notizie sulle elezioni europee di quest'anno?"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["thread"]["title"],
        "Quali sono le ultime notizie sulle elezioni europe..."
    );
    assert_eq!(body["thread"]["agentName"], "Studio");

    // Same id again
    let response = send(
        &app.router,
        request("POST", "/threads", token, Some(json!({"id": "t1", "firstMessage": "x"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app.router, request("POST", "/threads", token, Some(json!({"id": "t2"})))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app.router, request("GET", "/threads", token, None)).await;
    let body = body_json(response).await;
    assert_eq!(body["threads"].as_array().unwrap().len(), 1);

    let response = send(
        &app.router,
        request("PATCH", "/threads/t1", token, Some(json!({"title": "Elezioni"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["thread"]["title"], "Elezioni");

    let response = send(&app.router, request("GET", "/threads?id=t1", token, None)).await;
    let body = body_json(response).await;
    assert_eq!(body["thread"]["id"], "t1");
    assert_eq!(body["thread"]["messages"], json!([]));

    // Other users cannot see or delete it
    let response = send(&app.router, request("GET", "/threads?id=t1", Some("bob-token"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = send(&app.router, request("DELETE", "/threads/t1", Some("bob-token"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app.router, request("DELETE", "/threads/t1", token, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app.router, request("GET", "/threads?id=t1", token, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_without_fields_is_bad_request() {
    let app = app();
    send(
        &app.router,
        request("POST", "/threads", Some("alice-token"), Some(json!({"id": "t1", "firstMessage": "ciao"}))),
    )
    .await;

    let response = send(&app.router, request("PATCH", "/threads/t1", Some("alice-token"), Some(json!({})))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_composio_routes() {
    let app = app_with(FakeChat::new(false), true);
    let token = Some("alice-token");

    // Provider catalogue is offline, so the built-in list is served
    let body = body_json(send(&app.router, request("GET", "/composio/apps", token, None)).await).await;
    assert_eq!(body["apps"].as_array().unwrap().len(), 5);

    let body = body_json(send(&app.router, request("GET", "/composio/connections", token, None)).await).await;
    assert_eq!(body["connections"][0]["appId"], "gmail");
    assert_eq!(body["connections"][0]["userId"], "alice");

    let body = body_json(
        send(&app.router, request("POST", "/composio/connect", token, Some(json!({"appId": "slack"})))).await,
    )
    .await;
    assert_eq!(body["authUrl"], "https://auth.example.com/slack/alice");

    let response = send(&app.router, request("POST", "/composio/connect", token, Some(json!({})))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(
        send(
            &app.router,
            request("POST", "/composio/disconnect", token, Some(json!({"connectionId": "conn_alice"}))),
        )
        .await,
    )
    .await;
    assert_eq!(body["success"], true);

    // Someone else's connection reads as missing
    let response = send(
        &app.router,
        request("POST", "/composio/disconnect", Some("bob-token"), Some(json!({"connectionId": "conn_alice"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["success"], false);

    let body = body_json(send(&app.router, request("GET", "/composio/tools", token, None)).await).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["tools"][0]["name"], "GMAIL_SEND_EMAIL");

    let response = send(&app.router, request("GET", "/composio/tools", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_composio_without_key() {
    let app = app();
    let token = Some("alice-token");

    let body = body_json(send(&app.router, request("GET", "/composio/apps", token, None)).await).await;
    assert_eq!(body["apps"].as_array().unwrap().len(), 5);

    let response = send(&app.router, request("GET", "/composio/connections", token, None)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
