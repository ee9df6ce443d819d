//! Migration: Create wireguard_configs table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WireguardConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WireguardConfigs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WireguardConfigs::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(WireguardConfigs::PrivateKey)
                            .string_len(44)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WireguardConfigs::PublicKey)
                            .string_len(44)
                            .not_null(),
                    )
                    // CIDR text; PostgreSQL `inet` would need a cast on every bind
                    .col(
                        ColumnDef::new(WireguardConfigs::IpAddress)
                            .string_len(43)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WireguardConfigs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WireguardConfigs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wireguard_configs_user_id")
                            .from(WireguardConfigs::Table, WireguardConfigs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_wireguard_configs_user_id")
                    .table(WireguardConfigs::Table)
                    .col(WireguardConfigs::UserId)
                    .to_owned(),
            )
            .await?;

        // One peer per address
        manager
            .create_index(
                Index::create()
                    .name("idx_wireguard_configs_ip_address")
                    .table(WireguardConfigs::Table)
                    .col(WireguardConfigs::IpAddress)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WireguardConfigs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum WireguardConfigs {
    Table,
    Id,
    UserId,
    PrivateKey,
    PublicKey,
    IpAddress,
    CreatedAt,
    UpdatedAt,
}
