use sea_orm::entity::prelude::*;
use crate::enums::{CommandResponse, InteractionType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_interactions")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	pub timestamp: DateTimeUtc,
	pub user_id: i32,
	pub command_name: String,
	pub command_options: Option<String>,
	pub discord_guild_id: Option<i64>,
	pub discord_channel_id: Option<i64>,
	pub discord_id: Option<i64>,
	pub discord_response_id: Option<i64>,
	pub response: CommandResponse,
	#[sea_orm(column_name = "type")]
	pub interaction_type: InteractionType,
	pub error_reference_id: Option<String>,
	pub artist: Option<String>,
	pub album: Option<String>,
	pub track: Option<String>,
	pub hint_shown: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
