//! Service-call error boundary.
//!
//! Every public service operation runs through [`guarded`], which logs the
//! failure with its context and narrows it to the closed [`ServiceError`]
//! set. Deliberate service errors pass through unchanged; anything else
//! (schema mismatches, store failures, internal faults) becomes
//! [`ServiceError::Internal`].

use std::fmt::Debug;
use std::future::Future;

use crate::errors::{AppError, AppResult, ServiceError, ServiceResult};

pub async fn guarded<T, P, Fut>(
    service: &'static str,
    operation: &'static str,
    params: P,
    fut: Fut,
) -> ServiceResult<T>
where
    P: Debug,
    Fut: Future<Output = AppResult<T>>,
{
    let error = match fut.await {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };

    match error {
        AppError::Service(e) => {
            tracing::warn!(
                service,
                operation,
                params = ?params,
                "Service error in {}.{}: {}",
                service,
                operation,
                e.label()
            );
            Err(e)
        }
        AppError::Validation(e) => {
            tracing::error!(
                service,
                operation,
                params = ?params,
                "Validation error in {}.{}: {}",
                service,
                operation,
                e
            );
            Err(ServiceError::Internal)
        }
        AppError::Database(e) => {
            tracing::error!(
                service,
                operation,
                params = ?params,
                "Database error in {}.{}: {}",
                service,
                operation,
                e
            );
            Err(ServiceError::Internal)
        }
        AppError::Internal(message) => {
            tracing::error!(
                service,
                operation,
                params = ?params,
                "Unexpected error in {}.{}: {}",
                service,
                operation,
                message
            );
            Err(ServiceError::Internal)
        }
    }
}
