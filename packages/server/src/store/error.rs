use thiserror::Error;

/// Errors raised by a review collection backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The MongoDB driver reported a failure (connection, command, cursor).
    #[error("document store error: {0}")]
    Driver(#[from] mongodb::error::Error),
    /// A request value could not be encoded as BSON.
    #[error("failed to encode document value: {0}")]
    Serialization(String),
    /// The store assigned an identifier that is not an `ObjectId`.
    #[error("store returned a non-ObjectId identifier: {0}")]
    UnexpectedId(String),
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
