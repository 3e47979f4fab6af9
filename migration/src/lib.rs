pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250301_000001_resource_tables;
mod m20250301_000002_api_keys;
mod m20250302_000001_tracking_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_resource_tables::Migration),
            Box::new(m20250301_000002_api_keys::Migration),
            Box::new(m20250302_000001_tracking_tables::Migration),
        ]
    }
}
