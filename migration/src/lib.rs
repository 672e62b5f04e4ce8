pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_user_table;
mod m20260301_000002_create_reference_tables;
mod m20260301_000003_create_game_table;
mod m20260301_000004_create_game_association_tables;
mod m20260301_000005_create_user_game_table;
mod m20260301_000006_create_friend_request_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_user_table::Migration),
            Box::new(m20260301_000002_create_reference_tables::Migration),
            Box::new(m20260301_000003_create_game_table::Migration),
            Box::new(m20260301_000004_create_game_association_tables::Migration),
            Box::new(m20260301_000005_create_user_game_table::Migration),
            Box::new(m20260301_000006_create_friend_request_table::Migration),
        ]
    }
}
