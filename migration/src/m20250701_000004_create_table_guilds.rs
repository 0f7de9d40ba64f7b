use sea_orm_migration::prelude::*;
use crate::tables::{Channels, GuildBlockedUsers, GuildUsers, Guilds, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let guilds =
            Table::create()
                .table(Guilds::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Guilds::GuildId)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Guilds::DiscordGuildId)
                        .big_integer()
                        .unique_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Guilds::Name)
                        .string()
                        .null()
                )
                .col(
                    ColumnDef::new(Guilds::LastIndexed)
                        .date_time()
                        .null()
                )
                .col(
                    ColumnDef::new(Guilds::DisabledCommands)
                        .text()
                        .null()
                )
                .col(
                    ColumnDef::new(Guilds::WhoKnowsWhitelistRoleId)
                        .big_integer()
                        .null()
                )
                .to_owned();

        manager
            .create_table(guilds)
            .await?;

        let guild_users =
            Table::create()
                .table(GuildUsers::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(GuildUsers::GuildId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(GuildUsers::UserId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(GuildUsers::UserName)
                        .string()
                        .null()
                )
                .col(
                    ColumnDef::new(GuildUsers::Bot)
                        .boolean()
                        .default(false)
                        .not_null()
                )
                .col(
                    ColumnDef::new(GuildUsers::WhoKnowsWhitelisted)
                        .boolean()
                        .null()
                )
                .primary_key(
                    Index::create()
                        .col(GuildUsers::GuildId)
                        .col(GuildUsers::UserId)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_guild_users_guild_id")
                        .from_col(GuildUsers::GuildId)
                        .to(Guilds::Table, Guilds::GuildId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_guild_users_user_id")
                        .from_col(GuildUsers::UserId)
                        .to(Users::Table, Users::UserId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned();

        manager
            .create_table(guild_users)
            .await?;

        let blocked =
            Table::create()
                .table(GuildBlockedUsers::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(GuildBlockedUsers::GuildId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(GuildBlockedUsers::UserId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(GuildBlockedUsers::BlockedFromWhoKnows)
                        .boolean()
                        .default(false)
                        .not_null()
                )
                .primary_key(
                    Index::create()
                        .col(GuildBlockedUsers::GuildId)
                        .col(GuildBlockedUsers::UserId)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_guild_blocked_users_guild_id")
                        .from_col(GuildBlockedUsers::GuildId)
                        .to(Guilds::Table, Guilds::GuildId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_guild_blocked_users_user_id")
                        .from_col(GuildBlockedUsers::UserId)
                        .to(Users::Table, Users::UserId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned();

        manager
            .create_table(blocked)
            .await?;

        let channels =
            Table::create()
                .table(Channels::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Channels::ChannelId)
                        .integer()
                        .auto_increment()
                        .primary_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Channels::DiscordChannelId)
                        .big_integer()
                        .unique_key()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Channels::GuildId)
                        .integer()
                        .not_null()
                )
                .col(
                    ColumnDef::new(Channels::DisabledCommands)
                        .text()
                        .null()
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_channels_guild_id")
                        .from_col(Channels::GuildId)
                        .to(Guilds::Table, Guilds::GuildId)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned();

        manager
            .create_table(channels)
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Channels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GuildBlockedUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GuildUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Guilds::Table).to_owned())
            .await
    }
}
