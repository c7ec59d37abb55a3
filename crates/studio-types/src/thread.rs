use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

const TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThread {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub agent_id: String,
    pub agent_name: Option<String>,
    pub model_id: String,
    pub model_name: Option<String>,
    pub model_provider: Option<String>,
}

impl NewThread {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        first_message: &str,
        agent_id: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            title: derive_title(first_message),
            agent_id: agent_id.into(),
            agent_name: None,
            model_id: model_id.into(),
            model_name: None,
            model_provider: None,
        }
    }

    pub fn with_agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    pub fn with_model_details(mut self, name: impl Into<String>, provider: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self.model_provider = Some(provider.into());
        self
    }

    pub fn into_thread(self, now: DateTime<Utc>) -> Thread {
        Thread {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            agent_id: self.agent_id,
            agent_name: self.agent_name,
            model_id: self.model_id,
            model_name: self.model_name,
            model_provider: self.model_provider,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadUpdate {
    pub title: Option<String>,
    pub agent_id: Option<String>,
    pub agent_name: Option<String>,
    pub model_id: Option<String>,
    pub model_name: Option<String>,
    pub model_provider: Option<String>,
}

impl ThreadUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ThreadUpdate::default()
    }

    pub fn apply(self, thread: &mut Thread, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            thread.title = title;
        }
        if let Some(agent_id) = self.agent_id {
            thread.agent_id = agent_id;
        }
        if self.agent_name.is_some() {
            thread.agent_name = self.agent_name;
        }
        if let Some(model_id) = self.model_id {
            thread.model_id = model_id;
        }
        if self.model_name.is_some() {
            thread.model_name = self.model_name;
        }
        if self.model_provider.is_some() {
            thread.model_provider = self.model_provider;
        }
        thread.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadWithMessages {
    #[serde(flatten)]
    pub thread: Thread,
    pub messages: Vec<ChatMessage>,
}

/// Thread title from the first user message: the first 50 characters, with an
/// ellipsis when the message was longer.
pub fn derive_title(first_message: &str) -> String {
    let trimmed = first_message.trim();
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        let head: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}
