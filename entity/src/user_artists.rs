use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_artists")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub user_artist_id: i32,
	pub user_id: i32,
	pub name: String,
	pub playcount: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
