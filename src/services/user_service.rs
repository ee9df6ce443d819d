//! User service - registration and account state.

use async_trait::async_trait;

use super::error_boundary::guarded;
use crate::domain::{UserFilter, UserInsert, UserModel, UserUpdate};
use crate::errors::{OptionExt, ServiceResult};
use crate::infra::{Cache, Persistence};
use crate::with_unit_of_work;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const SERVICE: &str = "UserService";
const GET_USER_CACHE_KEY: &str = "user_service.get_user";

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create the user unless it exists; either way return the stored row.
    async fn register(&self, telegram_id: i64) -> ServiceResult<UserModel>;

    /// Look a user up by Telegram account (cached)
    async fn get_user(&self, telegram_id: i64) -> ServiceResult<UserModel>;

    async fn set_active(&self, telegram_id: i64, is_active: bool) -> ServiceResult<UserModel>;

    /// Delete the user together with its payments and configurations
    async fn remove_user(&self, telegram_id: i64) -> ServiceResult<UserModel>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager {
    persistence: Persistence,
    cache: Cache,
}

impl UserManager {
    pub fn new(persistence: Persistence, cache: Cache) -> Self {
        Self { persistence, cache }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn register(&self, telegram_id: i64) -> ServiceResult<UserModel> {
        guarded(SERVICE, "register", telegram_id, async {
            with_unit_of_work!(self.persistence, |uow| {
                let created = uow
                    .users()?
                    .insert_or_ignore(UserInsert::new(telegram_id))
                    .await?;
                let user = match created {
                    Some(user) => {
                        tracing::info!(telegram_id, user_id = user.id, "User registered");
                        user
                    }
                    None => uow
                        .users()?
                        .get_one(UserFilter::by_telegram_id(telegram_id))
                        .await?
                        .ok_or_not_found()?,
                };
                uow.commit().await?;
                Ok(user)
            })
        })
        .await
    }

    async fn get_user(&self, telegram_id: i64) -> ServiceResult<UserModel> {
        guarded(SERVICE, "get_user", telegram_id, async {
            self.cache
                .cached(GET_USER_CACHE_KEY, &telegram_id, None, || async {
                    with_unit_of_work!(self.persistence, |uow| {
                        let user = uow
                            .users()?
                            .get_one(UserFilter::by_telegram_id(telegram_id))
                            .await?;
                        Ok(user)
                    })
                })
                .await?
                .ok_or_not_found()
        })
        .await
    }

    async fn set_active(&self, telegram_id: i64, is_active: bool) -> ServiceResult<UserModel> {
        let user = guarded(SERVICE, "set_active", (telegram_id, is_active), async {
            with_unit_of_work!(self.persistence, |uow| {
                let user = uow
                    .users()?
                    .update(
                        UserFilter::by_telegram_id(telegram_id),
                        UserUpdate::active(is_active),
                    )
                    .await?
                    .ok_or_not_found()?;
                uow.commit().await?;
                Ok(user)
            })
        })
        .await?;

        self.cache.invalidate(GET_USER_CACHE_KEY, &telegram_id).await;
        Ok(user)
    }

    async fn remove_user(&self, telegram_id: i64) -> ServiceResult<UserModel> {
        let user = guarded(SERVICE, "remove_user", telegram_id, async {
            with_unit_of_work!(self.persistence, |uow| {
                let user = uow
                    .users()?
                    .delete(UserFilter::by_telegram_id(telegram_id))
                    .await?
                    .ok_or_not_found()?;
                uow.commit().await?;
                tracing::info!(telegram_id, user_id = user.id, "User removed");
                Ok(user)
            })
        })
        .await?;

        self.cache.invalidate(GET_USER_CACHE_KEY, &telegram_id).await;
        Ok(user)
    }
}
