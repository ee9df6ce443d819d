//! WireGuard provisioner - backend of a Telegram bot that sells WireGuard access
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **logging**: Console and file log sinks
//! - **domain**: Record schemas (users, payments, WireGuard configs)
//! - **infra**: Database, migrations, typed repositories, unit of work, cache
//! - **services**: Use cases behind the error boundary
//! - **api**: HTTP handlers and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod logging;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{PaymentMethod, PaymentStatus, TelegramId};
pub use errors::{AppError, AppResult, ServiceError, ServiceResult};
pub use infra::{Cache, Database, Persistence, UnitOfWork};
