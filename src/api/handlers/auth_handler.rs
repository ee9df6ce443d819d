//! Registration handler.

use axum::{extract::State, response::Json, routing::post, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::TelegramId;
use crate::errors::{ErrorResponse, ServiceResult};

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

/// Register a Telegram account.
///
/// Idempotent: registering an existing account changes nothing.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = TelegramId,
    responses(
        (status = 200, description = "Account registered", body = TelegramId),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 500, description = "Registration failed", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TelegramId>,
) -> ServiceResult<Json<TelegramId>> {
    state.users.register(payload.telegram_id).await?;
    Ok(Json(payload))
}
