use sea_orm_migration::prelude::*;
use crate::tables::{UserAlbums, UserArtists, UserTracks, Users};

const FK_USER_ARTISTS_USER_ID: &str = "fk_user_artists_user_id";
const FK_USER_ALBUMS_USER_ID: &str = "fk_user_albums_user_id";
const FK_USER_TRACKS_USER_ID: &str = "fk_user_tracks_user_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let artists =
            Table::create()
                .table(UserArtists::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(UserArtists::UserArtistId)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserArtists::UserId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserArtists::Name)
                        .string_len(512)
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserArtists::Playcount)
                        .integer()
                        .not_null()
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(FK_USER_ARTISTS_USER_ID)
                        .from_col(UserArtists::UserId)
                        .to(Users::Table, Users::UserId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned();

        manager
            .create_table(artists)
            .await?;

        let albums =
            Table::create()
                .table(UserAlbums::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(UserAlbums::UserAlbumId)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserAlbums::UserId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserAlbums::Name)
                        .string_len(512)
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserAlbums::ArtistName)
                        .string_len(512)
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserAlbums::Playcount)
                        .integer()
                        .not_null()
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(FK_USER_ALBUMS_USER_ID)
                        .from_col(UserAlbums::UserId)
                        .to(Users::Table, Users::UserId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned();

        manager
            .create_table(albums)
            .await?;

        let tracks =
            Table::create()
                .table(UserTracks::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(UserTracks::UserTrackId)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserTracks::UserId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserTracks::Name)
                        .string_len(512)
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserTracks::ArtistName)
                        .string_len(512)
                        .not_null()
                )
                .col(
                    ColumnDef::new(UserTracks::Playcount)
                        .integer()
                        .not_null()
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(FK_USER_TRACKS_USER_ID)
                        .from_col(UserTracks::UserId)
                        .to(Users::Table, Users::UserId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned();

        manager
            .create_table(tracks)
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTracks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAlbums::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserArtists::Table).to_owned())
            .await
    }
}
