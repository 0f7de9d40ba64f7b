use sea_orm_migration::prelude::*;
use crate::tables::{UserPlays, Users};

const FK_USER_PLAYS_USER_ID: &str = "fk_user_plays_user_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table =
            Table::create()
                .table(UserPlays::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(UserPlays::UserPlayId)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserPlays::UserId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserPlays::TrackName)
                        .string_len(512)
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserPlays::AlbumName)
                        .string_len(512)
                        .null()
                )
                .col(
                    ColumnDef::new(UserPlays::ArtistName)
                        .string_len(512)
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserPlays::TimePlayed)
                        .date_time()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserPlays::PlaySource)
                        .integer()
                        .default(0)
                        .not_null()
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(FK_USER_PLAYS_USER_ID)
                        .from_col(UserPlays::UserId)
                        .to(Users::Table, Users::UserId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned();

        manager
            .create_table(table)
            .await?;

        let index =
            Index::create()
                .name("idx_user_plays_user_id_time_played")
                .table(UserPlays::Table)
                .col(UserPlays::UserId)
                .col(UserPlays::TimePlayed)
                .to_owned();

        manager
            .create_index(index)
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table =
            Table::drop()
                .table(UserPlays::Table)
                .to_owned();

        manager
            .drop_table(table)
            .await
    }
}
