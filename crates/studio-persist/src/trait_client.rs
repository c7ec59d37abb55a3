use async_trait::async_trait;
use studio_types::{ChatMessage, NewMessage, NewThread, Thread, ThreadUpdate, ThreadWithMessages};

use crate::error::Result;

/// Storage for threads and their messages
///
/// Implementations own id and timestamp assignment. Lookups return `Ok(None)`
/// for missing rows; only infrastructure failures are errors.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Insert a thread. Fails with `ThreadExists` if the id is taken.
    async fn create_thread(&self, thread: NewThread) -> Result<Thread>;

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Thread plus its messages in creation order
    async fn get_thread_with_messages(&self, thread_id: &str) -> Result<Option<ThreadWithMessages>> {
        let Some(thread) = self.get_thread(thread_id).await? else {
            return Ok(None);
        };
        let messages = self.get_messages(thread_id).await?;
        Ok(Some(ThreadWithMessages { thread, messages }))
    }

    /// A user's threads, most recently updated first
    async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>>;

    async fn update_thread(&self, thread_id: &str, update: ThreadUpdate) -> Result<Option<Thread>>;

    async fn update_thread_title(&self, thread_id: &str, title: &str) -> Result<Option<Thread>> {
        let update = ThreadUpdate {
            title: Some(title.to_string()),
            ..Default::default()
        };
        self.update_thread(thread_id, update).await
    }

    /// Bump `updated_at` to now
    async fn touch_thread(&self, thread_id: &str) -> Result<()>;

    /// Remove a thread and all of its messages. Returns false if it did not exist.
    async fn delete_thread(&self, thread_id: &str) -> Result<bool>;

    /// Append a message. Fails with `ThreadNotFound` if the thread is missing.
    async fn create_message(&self, message: NewMessage) -> Result<ChatMessage>;

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<ChatMessage>>;
}
