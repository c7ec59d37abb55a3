use serde_json::json;
use studio_persist::{MemoryPersistenceClient, PersistError, PersistenceClient};
use studio_types::{NewMessage, NewThread, Part, Role, ThreadUpdate, ToolPart};

fn new_thread(id: &str, user: &str) -> NewThread {
    NewThread::new(id, user, "Ciao, che tempo fa a Roma?", "studio", "openai/gpt-oss-20b:free")
}

#[tokio::test]
async fn test_text_message_roundtrip() {
    let db = MemoryPersistenceClient::new();
    db.create_thread(new_thread("t1", "u1")).await.unwrap();

    let saved = db
        .create_message(NewMessage::assistant("t1", vec![Part::text("a")]))
        .await
        .unwrap();

    let loaded = db.get_thread_with_messages("t1").await.unwrap().unwrap();
    assert_eq!(loaded.messages.len(), 1);
    assert_eq!(loaded.messages[0].content, "a");
    assert_eq!(loaded.messages[0].parts, vec![Part::text("a")]);
    assert_eq!(loaded.messages[0], saved);
}

#[tokio::test]
async fn test_tool_parts_survive_roundtrip() {
    let db = MemoryPersistenceClient::new();
    db.create_thread(new_thread("t1", "u1")).await.unwrap();

    let mut part = ToolPart::streaming("c1", "smartSearch");
    part.input_available(json!({"query": "roma"})).unwrap();
    part.complete(json!({"answer": "sole"})).unwrap();
    let parts = vec![Part::Tool(part), Part::text("Sole.")];

    db.create_message(NewMessage::assistant("t1", parts.clone())).await.unwrap();
    let messages = db.get_messages("t1").await.unwrap();

    assert_eq!(messages[0].parts, parts);
    assert_eq!(messages[0].role, Role::Assistant);
    assert_eq!(messages[0].content, "Sole.");
}

#[tokio::test]
async fn test_duplicate_thread_rejected() {
    let db = MemoryPersistenceClient::new();
    db.create_thread(new_thread("t1", "u1")).await.unwrap();
    let err = db.create_thread(new_thread("t1", "u1")).await.unwrap_err();
    assert!(matches!(err, PersistError::ThreadExists(id) if id == "t1"));
}

#[tokio::test]
async fn test_message_for_missing_thread() {
    let db = MemoryPersistenceClient::new();
    let err = db.create_message(NewMessage::user("nope", "hi")).await.unwrap_err();
    assert!(matches!(err, PersistError::ThreadNotFound(_)));
}

#[tokio::test]
async fn test_list_threads_by_recent_activity() {
    let db = MemoryPersistenceClient::new();
    db.create_thread(new_thread("old", "u1")).await.unwrap();
    db.create_thread(new_thread("new", "u1")).await.unwrap();
    db.create_thread(new_thread("other", "u2")).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    db.touch_thread("old").await.unwrap();

    let threads = db.list_threads("u1").await.unwrap();
    let ids: Vec<&str> = threads.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["old", "new"]);
}

#[tokio::test]
async fn test_update_and_title() {
    let db = MemoryPersistenceClient::new();
    db.create_thread(new_thread("t1", "u1")).await.unwrap();

    let renamed = db.update_thread_title("t1", "Meteo").await.unwrap().unwrap();
    assert_eq!(renamed.title, "Meteo");

    let update = ThreadUpdate {
        model_id: Some("openai/gpt-4.1-mini".to_string()),
        ..Default::default()
    };
    let updated = db.update_thread("t1", update).await.unwrap().unwrap();
    assert_eq!(updated.title, "Meteo");
    assert_eq!(updated.model_id, "openai/gpt-4.1-mini");

    assert!(db.update_thread_title("missing", "x").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_cascades_messages() {
    let db = MemoryPersistenceClient::new();
    db.create_thread(new_thread("t1", "u1")).await.unwrap();
    db.create_message(NewMessage::user("t1", "hi")).await.unwrap();

    assert!(db.delete_thread("t1").await.unwrap());
    assert!(!db.delete_thread("t1").await.unwrap());
    assert!(db.get_thread("t1").await.unwrap().is_none());
    assert_eq!(db.message_count().await, 0);
}
