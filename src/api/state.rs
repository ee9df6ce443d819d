//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::infra::{Cache, Database};
use crate::services::{ConfigService, PaymentService, ServiceContainer, Services, UserService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub payments: Arc<dyn PaymentService>,
    pub configs: Arc<dyn ConfigService>,
    /// Used by the health check
    pub database: Arc<Database>,
    pub cache: Cache,
}

impl AppState {
    /// Wire the production services over `database` and `cache`.
    pub fn from_parts(database: Arc<Database>, cache: Cache) -> Self {
        let services = Services::from_connection(database.get_connection(), cache.clone());
        Self::with_services(&services, database, cache)
    }

    /// Build state from any service container (mocks included).
    pub fn with_services(
        services: &dyn ServiceContainer,
        database: Arc<Database>,
        cache: Cache,
    ) -> Self {
        Self {
            users: services.users(),
            payments: services.payments(),
            configs: services.configs(),
            database,
            cache,
        }
    }
}
