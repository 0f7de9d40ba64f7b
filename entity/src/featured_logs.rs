use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "featured_logs")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub featured_log_id: i32,
	pub user_id: Option<i32>,
	pub description: Option<String>,
	pub date_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
