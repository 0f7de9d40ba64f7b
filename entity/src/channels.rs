use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "channels")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub channel_id: i32,
	#[sea_orm(unique)]
	pub discord_channel_id: i64,
	pub guild_id: i32,
	pub disabled_commands: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
