use sea_orm_migration::prelude::*;
use crate::tables::{Friends, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table =
            Table::create()
                .table(Friends::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Friends::FriendId)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Friends::UserId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Friends::FriendUserId)
                        .integer()
                        .not_null()
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_friends_user_id")
                        .from_col(Friends::UserId)
                        .to(Users::Table, Users::UserId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_friends_friend_user_id")
                        .from_col(Friends::FriendUserId)
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
                .table(Friends::Table)
                .to_owned();

        manager
            .drop_table(table)
            .await
    }
}
