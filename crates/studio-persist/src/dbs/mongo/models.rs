use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use studio_types::{ChatMessage, Part, Role, Thread};

/// Thread document. Ids are client-supplied strings, stored as `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub thread_id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub metadata: Value,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<Thread> for MongoThread {
    fn from(t: Thread) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            title: t.title,
            agent_id: t.agent_id,
            agent_name: t.agent_name,
            model_id: t.model_id,
            model_name: t.model_name,
            model_provider: t.model_provider,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<MongoThread> for Thread {
    fn from(t: MongoThread) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            title: t.title,
            agent_id: t.agent_id,
            agent_name: t.agent_name,
            model_id: t.model_id,
            model_name: t.model_name,
            model_provider: t.model_provider,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<ChatMessage> for MongoMessage {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            thread_id: m.thread_id,
            role: m.role,
            content: m.content,
            parts: m.parts,
            metadata: m.metadata,
            created_at: m.created_at,
        }
    }
}

impl From<MongoMessage> for ChatMessage {
    fn from(m: MongoMessage) -> Self {
        Self {
            id: m.id,
            thread_id: m.thread_id,
            role: m.role,
            content: m.content,
            parts: m.parts,
            metadata: m.metadata,
            created_at: m.created_at,
        }
    }
}
