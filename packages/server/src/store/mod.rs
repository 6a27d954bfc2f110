mod error;
mod traits;

pub mod memory;
pub mod mongo;

pub use error::StoreError;
pub use memory::MemoryReviewCollection;
pub use mongo::MongoReviewCollection;
pub use traits::ReviewCollection;

use mongodb::bson::oid::ObjectId;

/// Parse a path identifier into an `ObjectId`.
///
/// Malformed input yields `None` so callers treat it the same as a missing record.
pub fn parse_id(raw: &str) -> Option<ObjectId> {
    ObjectId::parse_str(raw).ok()
}
