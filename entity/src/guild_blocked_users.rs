use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "guild_blocked_users")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub guild_id: i32,
	#[sea_orm(primary_key, auto_increment = false)]
	pub user_id: i32,
	pub blocked_from_who_knows: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
