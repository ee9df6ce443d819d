//! Config service - WireGuard peer configuration records.

use async_trait::async_trait;

use super::error_boundary::guarded;
use crate::domain::{ConfigFilter, ConfigInsert, ConfigModel, UserFilter};
use crate::errors::{OptionExt, ServiceError, ServiceResult};
use crate::infra::Persistence;
use crate::with_unit_of_work;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const SERVICE: &str = "ConfigService";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Store a peer configuration for an active user.
    ///
    /// Inactive users are forbidden; an address already in use (in any
    /// notation) conflicts.
    async fn issue_config(
        &self,
        telegram_id: i64,
        private_key: String,
        public_key: String,
        ip_address: String,
    ) -> ServiceResult<ConfigModel>;

    async fn list_configs(&self, telegram_id: i64) -> ServiceResult<Vec<ConfigModel>>;

    async fn revoke_config(&self, config_id: i32) -> ServiceResult<ConfigModel>;
}

pub struct ConfigManager {
    persistence: Persistence,
}

impl ConfigManager {
    pub fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl ConfigService for ConfigManager {
    async fn issue_config(
        &self,
        telegram_id: i64,
        private_key: String,
        public_key: String,
        ip_address: String,
    ) -> ServiceResult<ConfigModel> {
        // private_key stays out of the logged parameters
        let params = (telegram_id, public_key.clone(), ip_address.clone());

        guarded(SERVICE, "issue_config", params, async {
            with_unit_of_work!(self.persistence, |uow| {
                let user = uow
                    .users()?
                    .get_one(UserFilter::by_telegram_id(telegram_id))
                    .await?
                    .ok_or_not_found()?;
                if !user.is_active {
                    return Err(ServiceError::Forbidden.into());
                }

                // The unique address index is the guard; a conflict inserts nothing
                let config = uow
                    .configs()?
                    .insert_or_ignore(ConfigInsert {
                        user_id: user.id,
                        private_key,
                        public_key,
                        ip_address,
                    })
                    .await?
                    .ok_or(ServiceError::DataConflict)?;
                uow.commit().await?;
                tracing::info!(config_id = config.id, user_id = user.id, "Config issued");
                Ok(config)
            })
        })
        .await
    }

    async fn list_configs(&self, telegram_id: i64) -> ServiceResult<Vec<ConfigModel>> {
        guarded(SERVICE, "list_configs", telegram_id, async {
            with_unit_of_work!(self.persistence, |uow| {
                let user = uow
                    .users()?
                    .get_one(UserFilter::by_telegram_id(telegram_id))
                    .await?
                    .ok_or_not_found()?;
                let configs = uow.configs()?.get_all(ConfigFilter::by_user(user.id)).await?;
                Ok(configs)
            })
        })
        .await
    }

    async fn revoke_config(&self, config_id: i32) -> ServiceResult<ConfigModel> {
        guarded(SERVICE, "revoke_config", config_id, async {
            with_unit_of_work!(self.persistence, |uow| {
                let config = uow
                    .configs()?
                    .delete(ConfigFilter::by_id(config_id))
                    .await?
                    .ok_or_not_found()?;
                uow.commit().await?;
                tracing::info!(config_id, "Config revoked");
                Ok(config)
            })
        })
        .await
    }
}
