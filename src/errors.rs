//! Centralized error handling.
//!
//! Two layers of errors live here:
//! - [`AppError`]: everything that can go wrong inside the process
//!   (validation, store, service, internal). Never rendered to clients.
//! - [`ServiceError`]: the closed set of failure kinds a client can observe,
//!   each with a fixed HTTP status and a short label.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::infra::repositories::RepositoryValidationError;

/// Service-level failure kinds with a fixed transport mapping.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    #[error("NOT FOUND")]
    NotFound,

    #[error("FORBIDDEN")]
    Forbidden,

    #[error("INVALID DATA")]
    InvalidData,

    #[error("DATA FETCH ERROR")]
    DataFetch,

    #[error("INTERNAL ERROR")]
    Internal,

    #[error("DATA_CONFLICT")]
    DataConflict,
}

impl ServiceError {
    /// Short label sent to the client
    pub fn label(&self) -> &'static str {
        match self {
            ServiceError::NotFound => "NOT FOUND",
            ServiceError::Forbidden => "FORBIDDEN",
            ServiceError::InvalidData => "INVALID DATA",
            ServiceError::DataFetch => "DATA FETCH ERROR",
            ServiceError::Internal => "INTERNAL ERROR",
            ServiceError::DataConflict => "DATA_CONFLICT",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::InvalidData => StatusCode::BAD_REQUEST,
            ServiceError::DataFetch => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::DataConflict => StatusCode::CONFLICT,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Short error label
    #[schema(example = "NOT FOUND")]
    pub detail: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(code = status.as_u16(), "ServiceError: {}", self.label());

        let body = ErrorResponse {
            detail: self.label().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Internal error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Deliberately raised, client-visible failure
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Schema mismatch at the repository boundary
    #[error(transparent)]
    Validation(#[from] RepositoryValidationError),

    /// Relational store failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Result type returned by the service layer
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::Service(ServiceError::NotFound))
    }
}

/// Convenience constructors
impl AppError {
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
