pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_venues;
mod m20240101_000002_create_artists;
mod m20240101_000003_create_shows;
mod m20240101_000004_create_genres;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_venues::Migration),
            Box::new(m20240101_000002_create_artists::Migration),
            Box::new(m20240101_000003_create_shows::Migration),
            Box::new(m20240101_000004_create_genres::Migration),
        ]
    }
}
