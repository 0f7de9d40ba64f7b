pub use sea_orm_migration::prelude::*;

mod m20250701_000001_create_table_users;
mod m20250701_000002_create_table_user_aggregates;
mod m20250701_000003_create_table_user_plays;
mod m20250701_000004_create_table_guilds;
mod m20250701_000005_create_table_friends;
mod m20250701_000006_create_table_user_interactions;
mod m20250701_000007_create_table_featured_logs;
mod tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250701_000001_create_table_users::Migration),
            Box::new(m20250701_000002_create_table_user_aggregates::Migration),
            Box::new(m20250701_000003_create_table_user_plays::Migration),
            Box::new(m20250701_000004_create_table_guilds::Migration),
            Box::new(m20250701_000005_create_table_friends::Migration),
            Box::new(m20250701_000006_create_table_user_interactions::Migration),
            Box::new(m20250701_000007_create_table_featured_logs::Migration),
        ]
    }
}
