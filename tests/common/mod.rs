//! Shared fixtures for integration tests.

#![allow(dead_code)]

use sea_orm::ConnectOptions;

use wg_provisioner::infra::Database;

/// Fresh in-memory SQLite database with every migration applied.
///
/// A single pooled connection keeps the in-memory schema alive, so never
/// query the pool while a unit of work still holds it.
pub async fn setup_db() -> Database {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    Database::connect_with_options(options)
        .await
        .expect("failed to create test database")
}

/// 44-character base64 key derived from `seed`
pub fn wg_key(seed: char) -> String {
    format!("{}=", seed.to_string().repeat(43))
}
