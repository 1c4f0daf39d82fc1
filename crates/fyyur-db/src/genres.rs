//! Ordered genre rows for venues and artists.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{artist_genre, venue_genre};

pub(crate) async fn venue_genres<C: ConnectionTrait>(
    db: &C,
    venue_id: Uuid,
) -> Result<Vec<String>, DbErr> {
    Ok(venue_genre::Entity::find()
        .filter(venue_genre::Column::VenueId.eq(venue_id))
        .order_by_asc(venue_genre::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|g| g.name)
        .collect())
}

pub(crate) async fn artist_genres<C: ConnectionTrait>(
    db: &C,
    artist_id: Uuid,
) -> Result<Vec<String>, DbErr> {
    Ok(artist_genre::Entity::find()
        .filter(artist_genre::Column::ArtistId.eq(artist_id))
        .order_by_asc(artist_genre::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|g| g.name)
        .collect())
}

pub(crate) async fn replace_venue_genres<C: ConnectionTrait>(
    db: &C,
    venue_id: Uuid,
    genres: Vec<String>,
) -> Result<(), DbErr> {
    venue_genre::Entity::delete_many()
        .filter(venue_genre::Column::VenueId.eq(venue_id))
        .exec(db)
        .await?;

    if genres.is_empty() {
        return Ok(());
    }

    let rows = positioned(genres).map(|(position, name)| venue_genre::ActiveModel {
        venue_id: Set(venue_id),
        position: Set(position),
        name: Set(name),
    });
    venue_genre::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub(crate) async fn replace_artist_genres<C: ConnectionTrait>(
    db: &C,
    artist_id: Uuid,
    genres: Vec<String>,
) -> Result<(), DbErr> {
    artist_genre::Entity::delete_many()
        .filter(artist_genre::Column::ArtistId.eq(artist_id))
        .exec(db)
        .await?;

    if genres.is_empty() {
        return Ok(());
    }

    let rows = positioned(genres).map(|(position, name)| artist_genre::ActiveModel {
        artist_id: Set(artist_id),
        position: Set(position),
        name: Set(name),
    });
    artist_genre::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

fn positioned(genres: Vec<String>) -> impl Iterator<Item = (i32, String)> {
    (0..).zip(genres)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_input_order() {
        let rows: Vec<_> = positioned(vec!["Jazz".into(), "Blues".into()]).collect();
        assert_eq!(rows, vec![(0, "Jazz".to_string()), (1, "Blues".to_string())]);
    }
}
