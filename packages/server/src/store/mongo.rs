use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Document, doc};
use mongodb::{Client, Collection};
use tracing::info;

use super::error::StoreError;
use super::traits::ReviewCollection;
use crate::config::MongoConfig;

/// MongoDB-backed review collection.
#[derive(Clone)]
pub struct MongoReviewCollection {
    collection: Collection<Document>,
}

impl MongoReviewCollection {
    /// Connect to MongoDB and bind to the configured collection.
    ///
    /// The driver connects lazily, so this only fails on an invalid URI.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.uri).await?;
        info!(
            database = %config.database,
            collection = %config.collection,
            "Using MongoDB review collection"
        );
        Ok(Self::new(
            client
                .database(&config.database)
                .collection(&config.collection),
        ))
    }

    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl ReviewCollection for MongoReviewCollection {
    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(&self, id: &ObjectId) -> Result<Option<Document>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": *id }).await?)
    }

    async fn insert_one(&self, doc: Document) -> Result<ObjectId, StoreError> {
        let result = self.collection.insert_one(doc).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::UnexpectedId(result.inserted_id.to_string()))
    }

    async fn update_one(&self, id: &ObjectId, set: Document) -> Result<bool, StoreError> {
        let result = self
            .collection
            .update_one(doc! { "_id": *id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }
}
