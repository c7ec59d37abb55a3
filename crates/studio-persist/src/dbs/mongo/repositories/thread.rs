use bson::Document;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::ReturnDocument, Client, Collection};
use studio_types::ThreadUpdate;

use crate::dbs::mongo::models::MongoThread;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    pub async fn insert(&self, thread: &MongoThread) -> Result<()> {
        self.collection.insert_one(thread).await?;
        Ok(())
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<Option<MongoThread>> {
        Ok(self.collection.find_one(doc! { "_id": thread_id }).await?)
    }

    pub async fn list_threads(&self, user_id: &str) -> Result<Vec<MongoThread>> {
        let threads = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "updated_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    pub async fn update(&self, thread_id: &str, update: ThreadUpdate) -> Result<Option<MongoThread>> {
        let mut set = Document::new();
        if let Some(title) = update.title {
            set.insert("title", title);
        }
        if let Some(agent_id) = update.agent_id {
            set.insert("agent_id", agent_id);
        }
        if let Some(agent_name) = update.agent_name {
            set.insert("agent_name", agent_name);
        }
        if let Some(model_id) = update.model_id {
            set.insert("model_id", model_id);
        }
        if let Some(model_name) = update.model_name {
            set.insert("model_name", model_name);
        }
        if let Some(model_provider) = update.model_provider {
            set.insert("model_provider", model_provider);
        }
        set.insert("updated_at", bson::DateTime::from_chrono(Utc::now()));

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": thread_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Returns whether a thread was matched
    pub async fn touch(&self, thread_id: &str) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": thread_id },
                doc! { "$set": { "updated_at": bson::DateTime::from_chrono(Utc::now()) } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete(&self, thread_id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": thread_id }).await?;
        Ok(result.deleted_count > 0)
    }
}
