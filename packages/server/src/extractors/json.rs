use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A `Json<T>` wrapper whose rejections become `AppError::Validation`, so a
/// malformed or non-object body gets the same structured 400 as any other
/// validation failure.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let message = match &rejection {
                    JsonRejection::MissingJsonContentType(_) => {
                        "Expected request with `Content-Type: application/json`".to_string()
                    }
                    other => other.body_text(),
                };
                tracing::debug!(status = %rejection.status(), "Rejected request body: {message}");
                AppError::Validation(message)
            })?;
        Ok(AppJson(value))
    }
}

/// Like [`AppJson`], but a request without a body reads as `T::default()`.
///
/// Clients that post nothing get the same result as posting `{}`; a body
/// that is present must still be valid JSON of the expected shape.
pub struct JsonOrEmpty<T>(pub T);

const BODY_LIMIT: usize = 2 * 1024 * 1024;

impl<S, T> FromRequest<S> for JsonOrEmpty<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, BODY_LIMIT).await.map_err(|err| {
            tracing::debug!("Failed to read request body: {err}");
            AppError::Validation("Failed to read request body".into())
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonOrEmpty(T::default()));
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        let AppJson(value) = AppJson::<T>::from_request(req, state).await?;
        Ok(JsonOrEmpty(value))
    }
}
