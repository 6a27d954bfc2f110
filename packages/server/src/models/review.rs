use mongodb::bson::{Bson, Document, to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::store::StoreError;

/// Query parameters for listing reviews.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ReviewListQuery {
    /// Only return reviews for this product.
    #[param(example = "1")]
    pub product_id: Option<String>,
}

impl ReviewListQuery {
    /// Parse the `product_id` filter. Absent or empty means no filter.
    pub fn product_filter(&self) -> Result<Option<i64>, AppError> {
        match self.product_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::Validation("product_id must be an integer".into())),
        }
    }
}

/// Body of a create request. Fields are not validated; missing ones are stored as null.
#[derive(Debug, Default, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    #[schema(value_type = Option<i64>, example = 1)]
    pub product_id: Value,
    #[schema(value_type = Option<i64>, example = 1)]
    pub customer_id: Value,
    #[schema(value_type = Option<i32>, example = 5)]
    pub rating: Value,
    #[schema(value_type = Option<String>, example = "Great product!")]
    pub comment: Value,
}

impl From<Map<String, Value>> for CreateReviewRequest {
    fn from(mut body: Map<String, Value>) -> Self {
        let mut take = |key: &str| body.remove(key).unwrap_or(Value::Null);
        Self {
            product_id: take("product_id"),
            customer_id: take("customer_id"),
            rating: take("rating"),
            comment: take("comment"),
        }
    }
}

impl CreateReviewRequest {
    /// Build the document to insert, stamped with `created_at`.
    pub fn into_document(self, created_at: String) -> Result<Document, StoreError> {
        let mut doc = Document::new();
        doc.insert("product_id", to_bson(&self.product_id)?);
        doc.insert("customer_id", to_bson(&self.customer_id)?);
        doc.insert("rating", to_bson(&self.rating)?);
        doc.insert("comment", to_bson(&self.comment)?);
        doc.insert("created_at", created_at);
        Ok(doc)
    }
}

/// Body of an update request.
///
/// A key absent from the JSON is `None` and left untouched; a key present
/// with `null` is `Some(Null)` and clears the field. Other keys are ignored.
#[derive(Debug, Default, utoipa::ToSchema)]
pub struct UpdateReviewRequest {
    #[schema(value_type = Option<i64>, example = 1)]
    pub product_id: Option<Value>,
    #[schema(value_type = Option<i64>, example = 1)]
    pub customer_id: Option<Value>,
    #[schema(value_type = Option<i32>, example = 4)]
    pub rating: Option<Value>,
    #[schema(value_type = Option<String>, example = "Still good after a month")]
    pub comment: Option<Value>,
}

impl From<Map<String, Value>> for UpdateReviewRequest {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            product_id: body.remove("product_id"),
            customer_id: body.remove("customer_id"),
            rating: body.remove("rating"),
            comment: body.remove("comment"),
        }
    }
}

impl UpdateReviewRequest {
    /// Build the `$set` document, always including `updated_at`.
    pub fn into_set_document(self, updated_at: String) -> Result<Document, StoreError> {
        let fields = [
            ("product_id", self.product_id),
            ("customer_id", self.customer_id),
            ("rating", self.rating),
            ("comment", self.comment),
        ];

        let mut set = Document::new();
        for (key, value) in fields {
            if let Some(value) = value {
                set.insert(key, to_bson(&value)?);
            }
        }
        set.insert("updated_at", updated_at);
        Ok(set)
    }
}

/// A review as returned by the API.
///
/// Always renders the four review fields (absent ones as `null`) and the
/// timestamps; any other keys stored in the document are not echoed.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    /// Store-assigned identifier, as 24 hex characters.
    #[serde(rename = "_id")]
    #[schema(example = "665f1c2e9b1d4a3f8c0e1a2b")]
    pub id: String,
    #[schema(value_type = Option<i64>, example = 1)]
    pub product_id: Value,
    #[schema(value_type = Option<i64>, example = 1)]
    pub customer_id: Value,
    #[schema(value_type = Option<i32>, example = 5)]
    pub rating: Value,
    #[schema(value_type = Option<String>, example = "Great product!")]
    pub comment: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2024-06-01T12:00:00.000000Z")]
    pub created_at: Option<Value>,
    /// Present once the review has been updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "2024-06-02T08:30:00.000000Z")]
    pub updated_at: Option<Value>,
    /// Display name of the reviewer. Only set on list results.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Ada Lovelace")]
    pub customer_name: Option<String>,
}

fn to_json(value: Option<&Bson>) -> Value {
    value
        .cloned()
        .map(Bson::into_relaxed_extjson)
        .unwrap_or(Value::Null)
}

impl From<Document> for ReviewResponse {
    fn from(doc: Document) -> Self {
        let id = match doc.get("_id") {
            Some(Bson::ObjectId(oid)) => oid.to_hex(),
            Some(Bson::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        Self {
            id,
            product_id: to_json(doc.get("product_id")),
            customer_id: to_json(doc.get("customer_id")),
            rating: to_json(doc.get("rating")),
            comment: to_json(doc.get("comment")),
            created_at: doc.get("created_at").map(|v| to_json(Some(v))),
            updated_at: doc.get("updated_at").map(|v| to_json(Some(v))),
            customer_name: None,
        }
    }
}
