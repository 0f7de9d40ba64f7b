use sea_orm_migration::prelude::*;
use crate::tables::{FeaturedLogs, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table =
            Table::create()
                .table(FeaturedLogs::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(FeaturedLogs::FeaturedLogId)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(FeaturedLogs::UserId)
                        .integer()
                        .null()
                )
                .col(
                    ColumnDef::new(FeaturedLogs::Description)
                        .text()
                        .null()
                )
                .col(
                    ColumnDef::new(FeaturedLogs::DateTime)
                        .date_time()
                        .not_null()
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_featured_logs_user_id")
                        .from_col(FeaturedLogs::UserId)
                        .to(Users::Table, Users::UserId)
                        .on_delete(ForeignKeyAction::SetNull)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned();

        manager
            .create_table(table)
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table =
            Table::drop()
                .table(FeaturedLogs::Table)
                .to_owned();

        manager
            .drop_table(table)
            .await
    }
}
