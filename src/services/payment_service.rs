//! Payment service - recording and settling payments.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::error_boundary::guarded;
use crate::domain::{
    PaymentFilter, PaymentInsert, PaymentMethod, PaymentModel, PaymentStatus, PaymentUpdate,
    UserFilter,
};
use crate::errors::{OptionExt, ServiceError, ServiceResult};
use crate::with_unit_of_work;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::infra::Persistence;

const SERVICE: &str = "PaymentService";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Record an unpaid payment for an existing user
    async fn create_payment(
        &self,
        telegram_id: i64,
        method: PaymentMethod,
        amount: Decimal,
    ) -> ServiceResult<PaymentModel>;

    async fn list_payments(&self, telegram_id: i64) -> ServiceResult<Vec<PaymentModel>>;

    /// Settle a payment; settling twice is a conflict
    async fn mark_paid(&self, payment_id: i32) -> ServiceResult<PaymentModel>;
}

pub struct PaymentManager {
    persistence: Persistence,
}

impl PaymentManager {
    pub fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl PaymentService for PaymentManager {
    async fn create_payment(
        &self,
        telegram_id: i64,
        method: PaymentMethod,
        amount: Decimal,
    ) -> ServiceResult<PaymentModel> {
        guarded(
            SERVICE,
            "create_payment",
            (telegram_id, method, amount),
            async {
                with_unit_of_work!(self.persistence, |uow| {
                    let user = uow
                        .users()?
                        .get_one(UserFilter::by_telegram_id(telegram_id))
                        .await?
                        .ok_or_not_found()?;
                    let payment = uow
                        .payments()?
                        .insert(PaymentInsert {
                            user_id: user.id,
                            status: PaymentStatus::Unpaid,
                            payment_method: method,
                            amount,
                        })
                        .await?;
                    uow.commit().await?;
                    tracing::info!(payment_id = payment.id, user_id = user.id, "Payment created");
                    Ok(payment)
                })
            },
        )
        .await
    }

    async fn list_payments(&self, telegram_id: i64) -> ServiceResult<Vec<PaymentModel>> {
        guarded(SERVICE, "list_payments", telegram_id, async {
            with_unit_of_work!(self.persistence, |uow| {
                let user = uow
                    .users()?
                    .get_one(UserFilter::by_telegram_id(telegram_id))
                    .await?
                    .ok_or_not_found()?;
                let payments = uow.payments()?.get_all(PaymentFilter::by_user(user.id)).await?;
                Ok(payments)
            })
        })
        .await
    }

    async fn mark_paid(&self, payment_id: i32) -> ServiceResult<PaymentModel> {
        guarded(SERVICE, "mark_paid", payment_id, async {
            with_unit_of_work!(self.persistence, |uow| {
                // Only an unpaid row matches, so concurrent settlements cannot both win
                let settled = uow
                    .payments()?
                    .update(
                        PaymentFilter {
                            id: Some(payment_id),
                            status: Some(PaymentStatus::Unpaid),
                            ..PaymentFilter::default()
                        },
                        PaymentUpdate::status(PaymentStatus::Paid),
                    )
                    .await?;

                let payment = match settled {
                    Some(payment) => payment,
                    None => {
                        let existing = uow
                            .payments()?
                            .get_one(PaymentFilter::by_id(payment_id))
                            .await?;
                        return Err(match existing {
                            Some(_) => ServiceError::DataConflict.into(),
                            None => ServiceError::NotFound.into(),
                        });
                    }
                };
                uow.commit().await?;
                tracing::info!(payment_id, "Payment settled");
                Ok(payment)
            })
        })
        .await
    }
}
