//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::infra::repositories::TimestampedEntity;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub telegram_id: i64,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    #[sea_orm(has_many = "super::wireguard_config::Entity")]
    WireguardConfigs,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::wireguard_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WireguardConfigs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TimestampedEntity for Entity {
    fn created_at() -> Column {
        Column::CreatedAt
    }

    fn updated_at() -> Column {
        Column::UpdatedAt
    }
}
