use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::part::Part;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A stored message. Owned by a thread and never modified once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub thread_id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// Insert payload handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub thread_id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
}

fn empty_metadata() -> Value {
    Value::Object(Default::default())
}

impl NewMessage {
    pub fn user(thread_id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            thread_id: thread_id.into(),
            role: Role::User,
            parts: vec![Part::text(text.clone())],
            content: text,
            metadata: empty_metadata(),
        }
    }

    /// Assistant message whose content is the concatenation of its text parts.
    pub fn assistant(thread_id: impl Into<String>, parts: Vec<Part>) -> Self {
        let content = parts.iter().filter_map(Part::as_text).collect::<String>();
        Self {
            thread_id: thread_id.into(),
            role: Role::Assistant,
            content,
            parts,
            metadata: empty_metadata(),
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn into_message(self, id: impl Into<String>, created_at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id: id.into(),
            thread_id: self.thread_id,
            role: self.role,
            content: self.content,
            parts: self.parts,
            metadata: self.metadata,
            created_at,
        }
    }
}

impl ChatMessage {
    pub fn text_content(&self) -> String {
        if self.parts.is_empty() {
            return self.content.clone();
        }
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}
