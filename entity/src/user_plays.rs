use sea_orm::entity::prelude::*;
use crate::enums::PlaySource;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_plays")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub user_play_id: i32,
	pub user_id: i32,
	pub track_name: String,
	pub album_name: Option<String>,
	pub artist_name: String,
	pub time_played: DateTimeUtc,
	pub play_source: PlaySource,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
