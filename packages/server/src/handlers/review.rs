use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::JsonOrEmpty;
use crate::extractors::query::AppQuery;
use crate::models::review::*;
use crate::models::shared::timestamp_now;
use crate::state::AppState;
use crate::store::{ReviewCollection, parse_id};
use crate::utils::enrichment::attach_customer_names;

#[utoipa::path(
    get,
    path = "/",
    tag = "Reviews",
    operation_id = "listReviews",
    summary = "List reviews",
    description = "Returns all reviews, optionally only those whose `product_id` equals the given integer. Each review carries `customer_name` resolved from the customer table; unknown customers show `Unknown Customer`.",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "List of reviews", body = Vec<ReviewResponse>),
        (status = 400, description = "Malformed query string or non-integer product_id (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(product_id = ?query.product_id))]
pub async fn list_reviews(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReviewListQuery>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let mut filter = Document::new();
    if let Some(product_id) = query.product_filter()? {
        filter.insert("product_id", Bson::Int64(product_id));
    }

    let reviews = state.reviews.find(filter).await?;
    let data = attach_customer_names(state.customers.as_ref(), reviews).await?;

    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Reviews",
    operation_id = "createReview",
    summary = "Create a review",
    description = "Stores a new review. Fields are not validated; omitted fields are stored as null, and a request without a body stores a review with every field null. `created_at` is set by the server.",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Body is not a JSON object (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    JsonOrEmpty(payload): JsonOrEmpty<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let mut doc = CreateReviewRequest::from(payload).into_document(timestamp_now())?;
    let id = state.reviews.insert_one(doc.clone()).await?;
    doc.insert("_id", id);

    tracing::info!(%id, "Review created");
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(doc))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Reviews",
    operation_id = "getReview",
    summary = "Get a review by ID",
    params(("id" = String, Path, description = "Review ID (24 hex characters)")),
    responses(
        (status = 200, description = "Review details", body = ReviewResponse),
        (status = 404, description = "Review not found or malformed ID (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewResponse>, AppError> {
    let id = require_id(&id)?;
    let doc = find_review(state.reviews.as_ref(), &id).await?;
    Ok(Json(doc.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Reviews",
    operation_id = "updateReview",
    summary = "Update a review",
    description = "Overwrites the provided fields among `product_id`, `customer_id`, `rating` and `comment`; other keys are ignored. `updated_at` is always refreshed, even for an empty or absent body.",
    params(("id" = String, Path, description = "Review ID (24 hex characters)")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Body is not a JSON object (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Review not found or malformed ID (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonOrEmpty(payload): JsonOrEmpty<Map<String, Value>>,
) -> Result<Json<ReviewResponse>, AppError> {
    let id = require_id(&id)?;
    find_review(state.reviews.as_ref(), &id).await?;

    let set = UpdateReviewRequest::from(payload).into_set_document(timestamp_now())?;
    if !state.reviews.update_one(&id, set).await? {
        return Err(not_found());
    }

    let doc = find_review(state.reviews.as_ref(), &id).await?;
    Ok(Json(doc.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Reviews",
    operation_id = "deleteReview",
    summary = "Delete a review",
    params(("id" = String, Path, description = "Review ID (24 hex characters)")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found or malformed ID (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = require_id(&id)?;
    if !state.reviews.delete_one(&id).await? {
        return Err(not_found());
    }

    tracing::info!(%id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found() -> AppError {
    AppError::NotFound("Review not found".into())
}

/// Malformed identifiers are reported exactly like missing reviews.
fn require_id(raw: &str) -> Result<ObjectId, AppError> {
    parse_id(raw).ok_or_else(not_found)
}

async fn find_review(reviews: &dyn ReviewCollection, id: &ObjectId) -> Result<Document, AppError> {
    reviews.find_one(id).await?.ok_or_else(not_found)
}
