//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::api::handlers::{auth_handler, health_handler};
use crate::domain::TelegramId;
use crate::errors::ErrorResponse;

/// OpenAPI documentation for the provisioning API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "WireGuard Provisioner",
        version = "0.1.0",
        description = "Account registration for the WireGuard provisioning bot"
    ),
    paths(auth_handler::register, health_handler::health),
    components(schemas(
        TelegramId,
        ErrorResponse,
        health_handler::HealthResponse,
        health_handler::ServiceHealth,
        health_handler::ServiceStatus,
    )),
    tags(
        (name = "Authentication", description = "Account registration"),
        (name = "Health", description = "Dependency status")
    )
)]
pub struct ApiDoc;
