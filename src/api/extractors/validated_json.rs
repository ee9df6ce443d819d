//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::ServiceError;

/// JSON body that failed neither parsing nor `validator` rules.
///
/// Any rejection is answered with [`ServiceError::InvalidData`]; the
/// detail is logged, never returned.
///
/// ```rust,ignore
/// async fn register(ValidatedJson(payload): ValidatedJson<TelegramId>) {
///     // payload.telegram_id is positive here
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Rejected request body: {}", e.body_text());
            ServiceError::InvalidData
        })?;

        value.validate().map_err(|e| {
            tracing::debug!("Request body failed validation: {}", format_validation_errors(&e));
            ServiceError::InvalidData
        })?;

        Ok(ValidatedJson(value))
    }
}

/// Format validation errors into one line
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}
