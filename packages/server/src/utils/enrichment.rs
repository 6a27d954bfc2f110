use std::collections::BTreeSet;

use mongodb::bson::{Bson, Document};
use sea_orm::DbErr;

use crate::customers::CustomerDirectory;
use crate::models::review::ReviewResponse;

/// Name shown for reviews whose customer cannot be resolved.
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Interpret a stored `customer_id` as a relational key.
///
/// Integral numbers that fit in `i32` qualify; zero, null, strings and the
/// like do not.
fn customer_key(value: Option<&Bson>) -> Option<i32> {
    let id = match value? {
        Bson::Int32(n) => *n,
        Bson::Int64(n) => i32::try_from(*n).ok()?,
        Bson::Double(d) if d.fract() == 0.0 => {
            if *d < f64::from(i32::MIN) || *d > f64::from(i32::MAX) {
                return None;
            }
            *d as i32
        }
        _ => return None,
    };
    (id != 0).then_some(id)
}

/// Distinct customer ids referenced by a batch of reviews, in ascending order.
pub fn referenced_customer_ids(reviews: &[Document]) -> Vec<i32> {
    reviews
        .iter()
        .filter_map(|doc| customer_key(doc.get("customer_id")))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Render reviews and attach `customer_name` from a single batch lookup.
pub async fn attach_customer_names(
    directory: &dyn CustomerDirectory,
    reviews: Vec<Document>,
) -> Result<Vec<ReviewResponse>, DbErr> {
    let ids = referenced_customer_ids(&reviews);
    let names = directory.names_by_ids(&ids).await?;
    tracing::debug!(
        reviews = reviews.len(),
        requested = ids.len(),
        resolved = names.len(),
        "Resolved customer names"
    );

    Ok(reviews
        .into_iter()
        .map(|doc| {
            let name = customer_key(doc.get("customer_id"))
                .and_then(|id| names.get(&id).cloned())
                .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
            let mut review = ReviewResponse::from(doc);
            review.customer_name = Some(name);
            review
        })
        .collect())
}
