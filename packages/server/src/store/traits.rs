use async_trait::async_trait;
use mongodb::bson::Document;
use mongodb::bson::oid::ObjectId;

use super::error::StoreError;

/// Identifier-keyed schemaless collection holding review documents.
#[async_trait]
pub trait ReviewCollection: Send + Sync {
    /// Return every document whose fields equal the ones in `filter`.
    ///
    /// An empty filter matches all documents.
    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError>;

    /// Look up a single document by identifier.
    async fn find_one(&self, id: &ObjectId) -> Result<Option<Document>, StoreError>;

    /// Store a new document and return the identifier assigned to it.
    async fn insert_one(&self, doc: Document) -> Result<ObjectId, StoreError>;

    /// Overwrite the given fields of a document.
    ///
    /// Returns `true` if a document with `id` existed.
    async fn update_one(&self, id: &ObjectId, set: Document) -> Result<bool, StoreError>;

    /// Delete a document by identifier.
    ///
    /// Returns `true` if the document was deleted, `false` if it did not exist.
    async fn delete_one(&self, id: &ObjectId) -> Result<bool, StoreError>;
}
