use mockito::Matcher;
use serde_json::json;
use studio_connect::{ComposioClient, ConnectorError, ConnectorProvider};

async fn client(server: &mockito::ServerGuard) -> ComposioClient {
    ComposioClient::new("cmp-key").unwrap().with_base_url(&server.url()).unwrap()
}

#[tokio::test]
async fn test_list_connections() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/connectedAccounts")
        .match_header("x-api-key", "cmp-key")
        .match_query(Matcher::UrlEncoded("user_uuid".into(), "user-1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"items": [
                {"id": "ca_1", "appName": "gmail", "status": "ACTIVE", "createdAt": "2025-01-01T00:00:00Z"},
                {"id": "ca_2", "appName": "slack", "status": "EXPIRED"}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let connections = client(&server).await.list_connections("user-1").await.unwrap();

    assert_eq!(connections.len(), 2);
    assert!(connections[0].is_active());
    assert!(!connections[1].is_active());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_apps() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/apps")
        .with_status(200)
        .with_body(json!({"items": [{"key": "gmail", "name": "Gmail", "logo": "https://logo"}]}).to_string())
        .create_async()
        .await;

    let apps = client(&server).await.list_apps().await.unwrap();
    assert_eq!(apps[0].id, "gmail");
    assert_eq!(apps[0].icon.as_deref(), Some("https://logo"));
    assert_eq!(apps[0].category, "other");
}

#[tokio::test]
async fn test_authorize_returns_redirect_url() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v2/connectedAccounts/initiateConnection")
        .match_body(Matcher::PartialJson(json!({"appName": "gmail", "entityId": "user-1"})))
        .with_status(200)
        .with_body(json!({"redirectUrl": "https://accounts.google.com/o/oauth2", "connectionStatus": "INITIATED"}).to_string())
        .create_async()
        .await;

    let url = client(&server).await.authorize("user-1", "gmail").await.unwrap();
    assert_eq!(url, "https://accounts.google.com/o/oauth2");
}

#[tokio::test]
async fn test_get_tools_scoped_to_apps() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v2/actions")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("apps".into(), "gmail,notion".into()),
            Matcher::UrlEncoded("entityId".into(), "user-1".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({"items": [{
                "name": "GMAIL_SEND_EMAIL",
                "description": "Send an email",
                "appName": "gmail",
                "parameters": {"type": "object", "properties": {"recipient_email": {"type": "string"}}}
            }]})
            .to_string(),
        )
        .create_async()
        .await;

    let tools = client(&server)
        .await
        .get_tools("user-1", &["gmail".to_string(), "notion".to_string()])
        .await
        .unwrap();

    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "GMAIL_SEND_EMAIL");
    assert_eq!(tools[0].app_id, "gmail");
}

#[tokio::test]
async fn test_execute_tool_reports_failure_flag() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v2/actions/GMAIL_SEND_EMAIL/execute")
        .with_status(200)
        .with_body(json!({"data": {}, "successfull": false, "error": "invalid recipient"}).to_string())
        .create_async()
        .await;

    let err = client(&server)
        .await
        .execute_tool("user-1", "GMAIL_SEND_EMAIL", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::Execution(ref m) if m == "invalid recipient"));
}

#[tokio::test]
async fn test_execute_tool_returns_data() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v2/actions/GMAIL_SEND_EMAIL/execute")
        .match_body(Matcher::PartialJson(json!({"entityId": "user-1", "input": {"recipient_email": "a@b.it"}})))
        .with_status(200)
        .with_body(json!({"data": {"messageId": "m1"}, "successful": true}).to_string())
        .create_async()
        .await;

    let output = client(&server)
        .await
        .execute_tool("user-1", "GMAIL_SEND_EMAIL", json!({"recipient_email": "a@b.it"}))
        .await
        .unwrap();
    assert_eq!(output, json!({"messageId": "m1"}));
}

#[tokio::test]
async fn test_revoke_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api/v1/connectedAccounts/ca_9")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let err = client(&server).await.revoke("ca_9").await.unwrap_err();
    assert!(matches!(err, ConnectorError::Status { status: 404, .. }));
}
