pub use sea_orm_migration::prelude::*;

mod m20250812_000001_create_indexer_tables;
mod m20250812_000002_create_event_tables;
mod m20250812_000003_create_stats_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250812_000001_create_indexer_tables::Migration),
            Box::new(m20250812_000002_create_event_tables::Migration),
            Box::new(m20250812_000003_create_stats_tables::Migration),
        ]
    }
}
