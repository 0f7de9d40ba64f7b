use sea_orm::entity::prelude::*;
use crate::enums::{DataSource, FmEmbedType, PrivacyLevel, UserType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub user_id: i32,
	#[sea_orm(unique)]
	pub discord_user_id: i64,
	pub user_name_last_fm: String,
	pub session_key_last_fm: Option<String>,
	pub user_type: UserType,
	pub data_source: DataSource,
	pub privacy_level: PrivacyLevel,
	pub fm_embed_type: FmEmbedType,
	pub fm_footer_options: i64,
	pub time_zone: Option<String>,
	pub blocked: bool,
	pub music_bot_tracking_disabled: Option<bool>,
	pub registered_last_fm: Option<DateTimeUtc>,
	pub last_indexed: Option<DateTimeUtc>,
	pub last_used: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
