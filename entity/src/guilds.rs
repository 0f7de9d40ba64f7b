use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "guilds")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub guild_id: i32,
	#[sea_orm(unique)]
	pub discord_guild_id: i64,
	pub name: Option<String>,
	pub last_indexed: Option<DateTimeUtc>,
	pub disabled_commands: Option<String>,
	pub who_knows_whitelist_role_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
