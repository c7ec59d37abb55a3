use async_trait::async_trait;
use chrono::Utc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Client;
use studio_types::{ChatMessage, NewMessage, NewThread, Thread, ThreadUpdate};

use crate::dbs::mongo::models::{MongoMessage, MongoThread};
use crate::dbs::mongo::repositories::{MongoMessageRepository, MongoThreadRepository};
use crate::error::{PersistError, Result};
use crate::trait_client::PersistenceClient;

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoPersistenceClient {
    message_repo: MongoMessageRepository,
    thread_repo: MongoThreadRepository,
}

impl MongoPersistenceClient {
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self {
            message_repo: MongoMessageRepository::new(&client, database),
            thread_repo: MongoThreadRepository::new(&client, database),
        })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        let thread = thread.into_thread(Utc::now());
        let doc: MongoThread = thread.clone().into();

        match self.thread_repo.insert(&doc).await {
            Ok(()) => Ok(thread),
            Err(PersistError::Database(e)) if is_duplicate_key(&e) => {
                Err(PersistError::ThreadExists(thread.id))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.thread_repo.get_thread(thread_id).await?.map(Into::into))
    }

    async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>> {
        let threads = self.thread_repo.list_threads(user_id).await?;
        Ok(threads.into_iter().map(Into::into).collect())
    }

    async fn update_thread(&self, thread_id: &str, update: ThreadUpdate) -> Result<Option<Thread>> {
        Ok(self.thread_repo.update(thread_id, update).await?.map(Into::into))
    }

    async fn touch_thread(&self, thread_id: &str) -> Result<()> {
        if self.thread_repo.touch(thread_id).await? {
            Ok(())
        } else {
            Err(PersistError::ThreadNotFound(thread_id.to_string()))
        }
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<bool> {
        let removed = self.message_repo.delete_for_thread(thread_id).await?;
        tracing::debug!(thread_id, removed, "deleted thread messages");
        self.thread_repo.delete(thread_id).await
    }

    async fn create_message(&self, message: NewMessage) -> Result<ChatMessage> {
        if self.thread_repo.get_thread(&message.thread_id).await?.is_none() {
            return Err(PersistError::ThreadNotFound(message.thread_id));
        }

        let message = message.into_message(uuid::Uuid::new_v4().to_string(), Utc::now());
        let doc: MongoMessage = message.clone().into();
        self.message_repo.save_message(&doc).await?;
        Ok(message)
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        let messages = self.message_repo.get_messages(thread_id).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }
}
