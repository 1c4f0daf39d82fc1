// Shared test utilities for integration tests
#![allow(dead_code)]

use chrono::{Duration, Utc};
use fyyur_db::booking;
use fyyur_db::forms::{ArtistForm, ShowForm, VenueForm};
use fyyur_db::sea_orm::DatabaseConnection;
use fyyur_db::DatabaseConfig;
use fyyur_migration::{Migrator, MigratorTrait};
use tempfile::TempDir;
use uuid::Uuid;

/// A migrated SQLite database living in a temp dir for the test's lifetime.
pub struct TestDb {
    pub db: DatabaseConnection,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig::sqlite(&dir.path().join("fyyur.db"));
    let db = fyyur_db::connect(&config).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    TestDb { db, _dir: dir }
}

pub fn venue_form(name: &str, city: &str, state: &str) -> VenueForm {
    VenueForm {
        name: name.to_string(),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        address: Some("1015 Folsom Street".to_string()),
        phone: Some("123-123-1234".to_string()),
        genres: vec!["Jazz".to_string()],
        ..Default::default()
    }
}

pub fn artist_form(name: &str) -> ArtistForm {
    ArtistForm {
        name: name.to_string(),
        city: Some("San Francisco".to_string()),
        state: Some("CA".to_string()),
        image_link: Some(format!("https://img.example.com/{}.jpg", name.len())),
        genres: vec!["Rock n Roll".to_string()],
        ..Default::default()
    }
}

pub async fn add_venue(db: &DatabaseConnection, name: &str, city: &str, state: &str) -> Uuid {
    booking::create_venue(db, venue_form(name, city, state))
        .await
        .unwrap()
        .record
}

pub async fn add_artist(db: &DatabaseConnection, name: &str) -> Uuid {
    booking::create_artist(db, artist_form(name))
        .await
        .unwrap()
        .record
}

/// Book a show `offset_days` from now (negative is in the past).
pub async fn add_show(
    db: &DatabaseConnection,
    artist_id: Uuid,
    venue_id: Uuid,
    offset_days: i64,
) -> Uuid {
    let start_time = (Utc::now() + Duration::days(offset_days)).fixed_offset();
    booking::create_show(
        db,
        ShowForm {
            artist_id,
            venue_id,
            start_time,
        },
    )
    .await
    .unwrap()
    .record
}
