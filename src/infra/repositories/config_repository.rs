//! WireGuard configuration repository binding.

use sea_orm::DatabaseTransaction;

use super::entities::ConfigEntity;
use super::typed::{EntitySchemas, TypedRepository};
use crate::domain::{ConfigFilter, ConfigInsert, ConfigModel, ConfigUpdate};

pub struct ConfigSchemas;

impl EntitySchemas for ConfigSchemas {
    type Entity = ConfigEntity;
    type Model = ConfigModel;
    type Insert = ConfigInsert;
    type Filter = ConfigFilter;
    type Update = ConfigUpdate;
}

pub type ConfigRepository<'s, C = DatabaseTransaction> = TypedRepository<'s, ConfigSchemas, C>;
