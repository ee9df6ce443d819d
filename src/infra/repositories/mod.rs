//! Repository layer - Data access abstraction
//!
//! Two levels:
//! - [`SqlRepository`]: untyped field-map CRUD over any timestamped entity
//! - [`TypedRepository`]: the same operations, checked against a schema set

mod base;
mod config_repository;
pub mod entities;
mod payment_repository;
mod typed;
mod user_repository;
mod validation;

pub use base::{CrudRepository, Fields, SqlRepository, TimestampedEntity};
pub use config_repository::{ConfigRepository, ConfigSchemas};
pub use payment_repository::{PaymentRepository, PaymentSchemas};
pub use typed::{EntitySchemas, Payload, TypedRepository};
pub use user_repository::{UserRepository, UserSchemas};
pub use validation::{
    redact, validate_input, validate_output, Direction, FieldError, RepositoryValidationError,
    Schema,
};
