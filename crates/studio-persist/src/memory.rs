use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use studio_types::{ChatMessage, NewMessage, NewThread, Thread, ThreadUpdate};
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct Store {
    threads: HashMap<String, Thread>,
    messages: HashMap<String, Vec<ChatMessage>>,
}

/// Process-local backend. Data lives as long as the client.
#[derive(Default)]
pub struct MemoryPersistenceClient {
    store: RwLock<Store>,
}

impl MemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored messages across all threads
    pub async fn message_count(&self) -> usize {
        self.store.read().await.messages.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl PersistenceClient for MemoryPersistenceClient {
    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        let mut store = self.store.write().await;
        if store.threads.contains_key(&thread.id) {
            return Err(PersistError::ThreadExists(thread.id));
        }

        let thread = thread.into_thread(Utc::now());
        store.threads.insert(thread.id.clone(), thread.clone());
        store.messages.entry(thread.id.clone()).or_default();
        tracing::debug!(thread_id = %thread.id, "thread created");
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.store.read().await.threads.get(thread_id).cloned())
    }

    async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>> {
        let store = self.store.read().await;
        let mut threads: Vec<Thread> = store
            .threads
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(threads)
    }

    async fn update_thread(&self, thread_id: &str, update: ThreadUpdate) -> Result<Option<Thread>> {
        let mut store = self.store.write().await;
        let Some(thread) = store.threads.get_mut(thread_id) else {
            return Ok(None);
        };
        update.apply(thread, Utc::now());
        Ok(Some(thread.clone()))
    }

    async fn touch_thread(&self, thread_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        match store.threads.get_mut(thread_id) {
            Some(thread) => {
                thread.updated_at = Utc::now();
                Ok(())
            }
            None => Err(PersistError::ThreadNotFound(thread_id.to_string())),
        }
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        store.messages.remove(thread_id);
        Ok(store.threads.remove(thread_id).is_some())
    }

    async fn create_message(&self, message: NewMessage) -> Result<ChatMessage> {
        let mut store = self.store.write().await;
        if !store.threads.contains_key(&message.thread_id) {
            return Err(PersistError::ThreadNotFound(message.thread_id));
        }

        let message = message.into_message(uuid::Uuid::new_v4().to_string(), Utc::now());
        store
            .messages
            .entry(message.thread_id.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        Ok(self
            .store
            .read()
            .await
            .messages
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }
}
