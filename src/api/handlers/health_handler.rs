//! Health check handler.

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::AppState;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: &'static str,
    pub services: ServiceHealth,
}

/// Individual dependency status
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceHealth {
    pub database: ServiceStatus,
    pub cache: ServiceStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    /// `healthy`, `unhealthy` or `disabled`
    pub status: &'static str,
}

impl ServiceStatus {
    /// The failure itself is logged; clients only see the status word
    fn from_result<E: std::fmt::Display>(dependency: &str, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self { status: "healthy" },
            Err(e) => {
                tracing::error!(dependency, "Health check failed: {}", e);
                Self { status: "unhealthy" }
            }
        }
    }

    fn is_down(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Database and cache connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "All dependencies reachable", body = HealthResponse),
        (status = 503, description = "A dependency is down", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ServiceStatus::from_result("database", state.database.ping().await);

    let cache = if state.cache.is_enabled() {
        ServiceStatus::from_result("cache", state.cache.ping().await)
    } else {
        ServiceStatus { status: "disabled" }
    };

    let degraded = database.is_down() || cache.is_down();
    let status_code = if degraded {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let response = HealthResponse {
        status: if degraded { "degraded" } else { "healthy" },
        services: ServiceHealth { database, cache },
    };

    (status_code, Json(response))
}
