use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;

use super::error::StoreError;
use super::traits::ReviewCollection;

/// Process-local review collection.
///
/// Documents are kept in insertion order. Filters follow MongoDB equality
/// semantics: numbers compare by value across int32/int64/double, and a
/// `null` filter value also matches a missing field.
#[derive(Default)]
pub struct MemoryReviewCollection {
    docs: RwLock<Vec<Document>>,
}

impl MemoryReviewCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

fn id_of(doc: &Document) -> Option<ObjectId> {
    doc.get_object_id("_id").ok()
}

fn values_match(stored: Option<&Bson>, wanted: &Bson) -> bool {
    let Some(stored) = stored else {
        return matches!(wanted, Bson::Null);
    };
    match (stored, wanted) {
        (Bson::Int32(_) | Bson::Int64(_), Bson::Int32(_) | Bson::Int64(_)) => {
            as_i64(stored) == as_i64(wanted)
        }
        (Bson::Double(_), _) | (_, Bson::Double(_)) => match (as_f64(stored), as_f64(wanted)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        _ => stored == wanted,
    }
}

fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        _ => None,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

fn matches_filter(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, wanted)| values_match(doc.get(key), wanted))
}

#[async_trait]
impl ReviewCollection for MemoryReviewCollection {
    async fn find(&self, filter: Document) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|doc| matches_filter(doc, &filter))
            .cloned()
            .collect())
    }

    async fn find_one(&self, id: &ObjectId) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|doc| id_of(doc) == Some(*id)).cloned())
    }

    async fn insert_one(&self, mut doc: Document) -> Result<ObjectId, StoreError> {
        let id = match doc.get("_id") {
            Some(Bson::ObjectId(id)) => *id,
            Some(other) => return Err(StoreError::UnexpectedId(other.to_string())),
            None => {
                let id = ObjectId::new();
                doc.insert("_id", id);
                id
            }
        };
        self.docs.write().await.push(doc);
        Ok(id)
    }

    async fn update_one(&self, id: &ObjectId, set: Document) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(doc) = docs.iter_mut().find(|doc| id_of(doc) == Some(*id)) else {
            return Ok(false);
        };
        for (key, value) in set {
            doc.insert(key, value);
        }
        Ok(true)
    }

    async fn delete_one(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        if let Some(pos) = docs.iter().position(|doc| id_of(doc) == Some(*id)) {
            docs.remove(pos);
        }
        Ok(docs.len() < before)
    }
}
