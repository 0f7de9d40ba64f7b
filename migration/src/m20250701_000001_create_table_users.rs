use sea_orm_migration::prelude::*;
use crate::tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table =
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Users::UserId)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Users::DiscordUserId)
                        .big_integer()
                        .unique_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Users::UserNameLastFm)
                        .string()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Users::SessionKeyLastFm)
                        .string()
                        .null()
                )
                .col(
                    ColumnDef::new(Users::UserType)
                        .integer()
                        .default(1)
                        .not_null()
                )
                .col(
                    ColumnDef::new(Users::DataSource)
                        .integer()
                        .default(1)
                        .not_null()
                )
                .col(
                    ColumnDef::new(Users::PrivacyLevel)
                        .integer()
                        .default(1)
                        .not_null()
                )
                .col(
                    ColumnDef::new(Users::FmEmbedType)
                        .integer()
                        .default(1)
                        .not_null()
                )
                .col(
                    ColumnDef::new(Users::FmFooterOptions)
                        .big_integer()
                        .default(0)
                        .not_null()
                )
                .col(
                    ColumnDef::new(Users::TimeZone)
                        .string_len(64)
                        .null()
                )
                .col(
                    ColumnDef::new(Users::Blocked)
                        .boolean()
                        .default(false)
                        .not_null()
                )
                .col(
                    ColumnDef::new(Users::MusicBotTrackingDisabled)
                        .boolean()
                        .null()
                )
                .col(
                    ColumnDef::new(Users::RegisteredLastFm)
                        .date_time()
                        .null()
                )
                .col(
                    ColumnDef::new(Users::LastIndexed)
                        .date_time()
                        .null()
                )
                .col(
                    ColumnDef::new(Users::LastUsed)
                        .date_time()
                        .null()
                )
                .to_owned();

        manager
            .create_table(table)
            .await?;

        let index =
            Index::create()
                .name("idx_users_user_name_last_fm")
                .table(Users::Table)
                .col(Users::UserNameLastFm)
                .to_owned();

        manager
            .create_index(index)
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table =
            Table::drop()
                .table(Users::Table)
                .to_owned();

        manager
            .drop_table(table)
            .await
    }
}
