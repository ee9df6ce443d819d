//! Payment repository binding.

use sea_orm::DatabaseTransaction;

use super::entities::PaymentEntity;
use super::typed::{EntitySchemas, TypedRepository};
use crate::domain::{PaymentFilter, PaymentInsert, PaymentModel, PaymentUpdate};

pub struct PaymentSchemas;

impl EntitySchemas for PaymentSchemas {
    type Entity = PaymentEntity;
    type Model = PaymentModel;
    type Insert = PaymentInsert;
    type Filter = PaymentFilter;
    type Update = PaymentUpdate;
}

pub type PaymentRepository<'s, C = DatabaseTransaction> = TypedRepository<'s, PaymentSchemas, C>;
