//! WireGuard configuration database entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::infra::repositories::TimestampedEntity;

#[derive(Clone, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "wireguard_configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub private_key: String,
    pub public_key: String,
    /// IPv4 network in CIDR notation
    pub ip_address: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .field("ip_address", &self.ip_address)
            .finish()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
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
