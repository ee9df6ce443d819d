//! Service Container - Centralized service access.
//!
//! SOLID (DIP): Depends on service traits, not implementations.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    ConfigManager, ConfigService, PaymentManager, PaymentService, UserManager, UserService,
};
use crate::infra::{Cache, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn users(&self) -> Arc<dyn UserService>;

    fn payments(&self) -> Arc<dyn PaymentService>;

    fn configs(&self) -> Arc<dyn ConfigService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    user_service: Arc<dyn UserService>,
    payment_service: Arc<dyn PaymentService>,
    config_service: Arc<dyn ConfigService>,
}

impl Services {
    /// Create a new service container from already built services
    pub fn new(
        user_service: Arc<dyn UserService>,
        payment_service: Arc<dyn PaymentService>,
        config_service: Arc<dyn ConfigService>,
    ) -> Self {
        Self {
            user_service,
            payment_service,
            config_service,
        }
    }

    /// Wire every service over one connection pool and cache
    pub fn from_connection(db: DatabaseConnection, cache: Cache) -> Self {
        let persistence = Persistence::new(db);

        Self {
            user_service: Arc::new(UserManager::new(persistence.clone(), cache)),
            payment_service: Arc::new(PaymentManager::new(persistence.clone())),
            config_service: Arc::new(ConfigManager::new(persistence)),
        }
    }
}

impl ServiceContainer for Services {
    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payment_service.clone()
    }

    fn configs(&self) -> Arc<dyn ConfigService> {
        self.config_service.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserModel;
    use crate::errors::ServiceError;
    use crate::services::{MockConfigService, MockPaymentService, MockUserService};
    use chrono::Utc;

    #[tokio::test]
    async fn test_container_hands_out_injected_services() {
        let mut users = MockUserService::new();
        users.expect_get_user().returning(|telegram_id| {
            Ok(UserModel {
                id: 1,
                telegram_id,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

        let mut payments = MockPaymentService::new();
        payments
            .expect_mark_paid()
            .returning(|_| Err(ServiceError::DataConflict));

        let services = Services::new(
            Arc::new(users),
            Arc::new(payments),
            Arc::new(MockConfigService::new()),
        );

        let user = services.users().get_user(77).await.unwrap();
        assert_eq!(user.telegram_id, 77);
        assert_eq!(
            services.payments().mark_paid(3).await.unwrap_err(),
            ServiceError::DataConflict
        );
    }
}
