//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - Repositories (untyped and schema-checked)
//! - Unit of Work for transaction management
//! - Redis result cache

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    ConfigRepository, Payload, PaymentRepository, RepositoryValidationError, TypedRepository,
    UserRepository,
};
pub use unit_of_work::{Persistence, UnitOfWork, UnitOfWorkFuture};
