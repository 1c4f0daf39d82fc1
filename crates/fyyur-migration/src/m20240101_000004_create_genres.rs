use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_venues::Venues;
use super::m20240101_000002_create_artists::Artists;

/// Genres live in one ordered row per (owner, position) instead of a
/// comma-joined column, so names may contain any character.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VenueGenres::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VenueGenres::VenueId).uuid().not_null())
                    .col(ColumnDef::new(VenueGenres::Position).integer().not_null())
                    .col(ColumnDef::new(VenueGenres::Name).string_len(120).not_null())
                    .primary_key(
                        Index::create()
                            .col(VenueGenres::VenueId)
                            .col(VenueGenres::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_venue_genres_venue_id")
                            .from(VenueGenres::Table, VenueGenres::VenueId)
                            .to(Venues::Table, Venues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ArtistGenres::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ArtistGenres::ArtistId).uuid().not_null())
                    .col(ColumnDef::new(ArtistGenres::Position).integer().not_null())
                    .col(ColumnDef::new(ArtistGenres::Name).string_len(120).not_null())
                    .primary_key(
                        Index::create()
                            .col(ArtistGenres::ArtistId)
                            .col(ArtistGenres::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_artist_genres_artist_id")
                            .from(ArtistGenres::Table, ArtistGenres::ArtistId)
                            .to(Artists::Table, Artists::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArtistGenres::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VenueGenres::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VenueGenres {
    Table,
    VenueId,
    Position,
    Name,
}

#[derive(DeriveIden)]
pub enum ArtistGenres {
    Table,
    ArtistId,
    Position,
    Name,
}
