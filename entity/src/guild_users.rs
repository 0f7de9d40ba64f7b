use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "guild_users")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub guild_id: i32,
	#[sea_orm(primary_key, auto_increment = false)]
	pub user_id: i32,
	pub user_name: Option<String>,
	pub bot: bool,
	pub who_knows_whitelisted: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
