use sea_orm_migration::prelude::*;
use crate::tables::{UserInteractions, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table =
            Table::create()
                .table(UserInteractions::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(UserInteractions::Id)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserInteractions::Timestamp)
                        .date_time()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserInteractions::UserId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserInteractions::CommandName)
                        .string_len(128)
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserInteractions::CommandOptions)
                        .text()
                        .null()
                )
                .col(
                    ColumnDef::new(UserInteractions::DiscordGuildId)
                        .big_integer()
                        .null()
                )
                .col(
                    ColumnDef::new(UserInteractions::DiscordChannelId)
                        .big_integer()
                        .null()
                )
                .col(
                    ColumnDef::new(UserInteractions::DiscordId)
                        .big_integer()
                        .null()
                )
                .col(
                    ColumnDef::new(UserInteractions::DiscordResponseId)
                        .big_integer()
                        .null()
                )
                .col(
                    ColumnDef::new(UserInteractions::Response)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserInteractions::Type)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserInteractions::ErrorReferenceId)
                        .string_len(64)
                        .null()
                )
                .col(
                    ColumnDef::new(UserInteractions::Artist)
                        .string_len(512)
                        .null()
                )
                .col(
                    ColumnDef::new(UserInteractions::Album)
                        .string_len(512)
                        .null()
                )
                .col(
                    ColumnDef::new(UserInteractions::Track)
                        .string_len(512)
                        .null()
                )
                .col(
                    ColumnDef::new(UserInteractions::HintShown)
                        .boolean()
                        .null()
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_user_interactions_user_id")
                        .from_col(UserInteractions::UserId)
                        .to(Users::Table, Users::UserId)
                        .on_delete(ForeignKeyAction::Cascade)
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
                .table(UserInteractions::Table)
                .to_owned();

        manager
            .drop_table(table)
            .await
    }
}
