//! Read side: grouped listings, name search, and detail views with shows
//! split into past and upcoming at read time.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, RelationTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{artist, show, venue};
use crate::error::{DirectoryError, EntityKind};
use crate::forms::{ArtistForm, VenueForm};
use crate::genres;

/// One row in a listing or a search result.
///
/// `num_upcoming_shows` counts every show of the entity, past ones included.
/// The name is kept for the external contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub id: Uuid,
    pub name: String,
    pub num_upcoming_shows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityVenues {
    pub city: Option<String>,
    pub state: Option<String>,
    pub venues: Vec<EntitySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntitySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Venue,
    Artist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistListing {
    pub id: Uuid,
    pub name: String,
}

/// A show as seen from a venue page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistShow {
    pub artist_id: Uuid,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// A show as seen from an artist page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueShow {
    pub venue_id: Uuid,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: venue::Model,
    pub genres: Vec<String>,
    pub past_shows: Vec<ArtistShow>,
    pub upcoming_shows: Vec<ArtistShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: artist::Model,
    pub genres: Vec<String>,
    pub past_shows: Vec<VenueShow>,
    pub upcoming_shows: Vec<VenueShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ShowListing {
    #[serde(serialize_with = "serialize_start_time")]
    pub start_time: DateTime<FixedOffset>,
    pub artist_id: Uuid,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub venue_id: Uuid,
    pub venue_name: String,
}

#[derive(Debug, FromQueryResult)]
struct ArtistShowRow {
    start_time: DateTime<FixedOffset>,
    artist_id: Uuid,
    artist_name: String,
    artist_image_link: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct VenueShowRow {
    start_time: DateTime<FixedOffset>,
    venue_id: Uuid,
    venue_name: String,
    venue_image_link: Option<String>,
}

/// Shows split on `start_time > now`; the halves are disjoint and together
/// hold every input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowPartition<T> {
    pub past: Vec<T>,
    pub upcoming: Vec<T>,
}

pub fn partition_shows<T>(
    rows: Vec<T>,
    now: DateTime<Utc>,
    start_time: impl Fn(&T) -> DateTime<FixedOffset>,
) -> ShowPartition<T> {
    let (upcoming, past) = rows
        .into_iter()
        .partition(|row| start_time(row).with_timezone(&Utc) > now);
    ShowPartition { past, upcoming }
}

/// `2035-04-01T20:00:00.000Z` style, always UTC with zeroed seconds.
pub fn format_start_time(t: DateTime<FixedOffset>) -> String {
    t.with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:00.000Z")
        .to_string()
}

fn serialize_start_time<S: serde::Serializer>(
    t: &DateTime<FixedOffset>,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_start_time(*t))
}

/// Total show count per parent id, for `column` = `VenueId` or `ArtistId`.
async fn show_counts<C: ConnectionTrait>(
    db: &C,
    column: show::Column,
) -> Result<HashMap<Uuid, u64>, DbErr> {
    let rows: Vec<(Uuid, i64)> = show::Entity::find()
        .select_only()
        .column(column)
        .column_as(Expr::col((show::Entity, show::Column::Id)).count(), "show_count")
        .group_by(column)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
        .collect())
}

/// Case-insensitive substring match, pushed into SQL where the backend folds
/// Unicode case itself. LIKE wildcards in the term match themselves.
///
/// SQLite's `LIKE` and `LOWER` only fold ASCII, so there no filter is
/// returned and the caller matches the fetched names with [`NameTerm`].
fn name_filter(backend: DbBackend, column: SimpleExpr, term: &str) -> Option<SimpleExpr> {
    match backend {
        DbBackend::Postgres => {
            let escaped = term
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            Some(Expr::expr(column).ilike(LikeExpr::new(format!("%{escaped}%")).escape('\\')))
        }
        _ => None,
    }
}

/// Search term folded for matching outside SQL.
struct NameTerm(Option<String>);

impl NameTerm {
    fn new(sql_filtered: bool, term: &str) -> Self {
        Self((!sql_filtered).then(|| term.to_lowercase()))
    }

    fn matches(&self, name: &str) -> bool {
        match &self.0 {
            Some(term) => name.to_lowercase().contains(term.as_str()),
            None => true,
        }
    }
}

/// Venues bucketed by (city, state).
///
/// Groups come out ordered by city then state, venues inside a group by name.
pub async fn list_venues_grouped_by_city<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<CityVenues>, DirectoryError> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::City)
        .order_by_asc(venue::Column::State)
        .order_by_asc(venue::Column::Name)
        .all(db)
        .await?;
    let counts = show_counts(db, show::Column::VenueId).await?;

    let mut areas: Vec<CityVenues> = Vec::new();
    for v in venues {
        let summary = EntitySummary {
            id: v.id,
            num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
            name: v.name,
        };
        match areas.last_mut() {
            Some(area) if area.city == v.city && area.state == v.state => {
                area.venues.push(summary)
            }
            _ => areas.push(CityVenues {
                city: v.city,
                state: v.state,
                venues: vec![summary],
            }),
        }
    }

    tracing::debug!(areas = areas.len(), "grouped venues by city");
    Ok(areas)
}

pub async fn list_artists<C: ConnectionTrait>(db: &C) -> Result<Vec<ArtistListing>, DirectoryError> {
    Ok(artist::Entity::find()
        .order_by_asc(artist::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|a| ArtistListing {
            id: a.id,
            name: a.name,
        })
        .collect())
}

/// Name search over venues or artists. An empty term matches everything.
pub async fn search<C: ConnectionTrait>(
    db: &C,
    kind: SearchKind,
    search_term: &str,
) -> Result<SearchResults, DirectoryError> {
    let backend = db.get_database_backend();
    let data: Vec<EntitySummary> = match kind {
        SearchKind::Venue => {
            let counts = show_counts(db, show::Column::VenueId).await?;
            let filter = name_filter(
                backend,
                Expr::col((venue::Entity, venue::Column::Name)).into(),
                search_term,
            );
            let term = NameTerm::new(filter.is_some(), search_term);
            venue::Entity::find()
                .apply_if(filter, |query, f| query.filter(f))
                .order_by_asc(venue::Column::Name)
                .all(db)
                .await?
                .into_iter()
                .filter(|v| term.matches(&v.name))
                .map(|v| EntitySummary {
                    num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
                    id: v.id,
                    name: v.name,
                })
                .collect()
        }
        SearchKind::Artist => {
            let counts = show_counts(db, show::Column::ArtistId).await?;
            let filter = name_filter(
                backend,
                Expr::col((artist::Entity, artist::Column::Name)).into(),
                search_term,
            );
            let term = NameTerm::new(filter.is_some(), search_term);
            artist::Entity::find()
                .apply_if(filter, |query, f| query.filter(f))
                .order_by_asc(artist::Column::Name)
                .all(db)
                .await?
                .into_iter()
                .filter(|a| term.matches(&a.name))
                .map(|a| EntitySummary {
                    num_upcoming_shows: counts.get(&a.id).copied().unwrap_or(0),
                    id: a.id,
                    name: a.name,
                })
                .collect()
        }
    };

    tracing::debug!(?kind, term = search_term, hits = data.len(), "search");
    Ok(SearchResults {
        count: data.len(),
        data,
    })
}

pub async fn search_venues<C: ConnectionTrait>(
    db: &C,
    search_term: &str,
) -> Result<SearchResults, DirectoryError> {
    search(db, SearchKind::Venue, search_term).await
}

pub async fn search_artists<C: ConnectionTrait>(
    db: &C,
    search_term: &str,
) -> Result<SearchResults, DirectoryError> {
    search(db, SearchKind::Artist, search_term).await
}

pub async fn get_venue_detail<C: ConnectionTrait>(
    db: &C,
    venue_id: Uuid,
) -> Result<VenueDetail, DirectoryError> {
    let venue = venue::Entity::find_by_id(venue_id)
        .one(db)
        .await?
        .ok_or(DirectoryError::NotFound {
            kind: EntityKind::Venue,
            id: venue_id,
        })?;
    let genres = genres::venue_genres(db, venue_id).await?;

    let rows = show::Entity::find()
        .select_only()
        .column(show::Column::StartTime)
        .column_as(artist::Column::Id, "artist_id")
        .column_as(artist::Column::Name, "artist_name")
        .column_as(artist::Column::ImageLink, "artist_image_link")
        .join(JoinType::InnerJoin, show::Relation::Artist.def())
        .filter(show::Column::VenueId.eq(venue_id))
        .order_by_asc(show::Column::StartTime)
        .into_model::<ArtistShowRow>()
        .all(db)
        .await?;

    let ShowPartition { past, upcoming } = partition_shows(rows, Utc::now(), |r| r.start_time);
    let to_show = |r: ArtistShowRow| ArtistShow {
        artist_id: r.artist_id,
        artist_name: r.artist_name,
        artist_image_link: r.artist_image_link,
        start_time: format_start_time(r.start_time),
    };
    let past_shows: Vec<ArtistShow> = past.into_iter().map(to_show).collect();
    let upcoming_shows: Vec<ArtistShow> = upcoming.into_iter().map(to_show).collect();

    Ok(VenueDetail {
        venue,
        genres,
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

pub async fn get_artist_detail<C: ConnectionTrait>(
    db: &C,
    artist_id: Uuid,
) -> Result<ArtistDetail, DirectoryError> {
    let artist = artist::Entity::find_by_id(artist_id)
        .one(db)
        .await?
        .ok_or(DirectoryError::NotFound {
            kind: EntityKind::Artist,
            id: artist_id,
        })?;
    let genres = genres::artist_genres(db, artist_id).await?;

    let rows = show::Entity::find()
        .select_only()
        .column(show::Column::StartTime)
        .column_as(venue::Column::Id, "venue_id")
        .column_as(venue::Column::Name, "venue_name")
        .column_as(venue::Column::ImageLink, "venue_image_link")
        .join(JoinType::InnerJoin, show::Relation::Venue.def())
        .filter(show::Column::ArtistId.eq(artist_id))
        .order_by_asc(show::Column::StartTime)
        .into_model::<VenueShowRow>()
        .all(db)
        .await?;

    let ShowPartition { past, upcoming } = partition_shows(rows, Utc::now(), |r| r.start_time);
    let to_show = |r: VenueShowRow| VenueShow {
        venue_id: r.venue_id,
        venue_name: r.venue_name,
        venue_image_link: r.venue_image_link,
        start_time: format_start_time(r.start_time),
    };
    let past_shows: Vec<VenueShow> = past.into_iter().map(to_show).collect();
    let upcoming_shows: Vec<VenueShow> = upcoming.into_iter().map(to_show).collect();

    Ok(ArtistDetail {
        artist,
        genres,
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

/// Every show joined to both parents, earliest first.
pub async fn list_shows<C: ConnectionTrait>(db: &C) -> Result<Vec<ShowListing>, DirectoryError> {
    Ok(show::Entity::find()
        .select_only()
        .column(show::Column::StartTime)
        .column_as(artist::Column::Id, "artist_id")
        .column_as(artist::Column::Name, "artist_name")
        .column_as(artist::Column::ImageLink, "artist_image_link")
        .column_as(venue::Column::Id, "venue_id")
        .column_as(venue::Column::Name, "venue_name")
        .join(JoinType::InnerJoin, show::Relation::Artist.def())
        .join(JoinType::InnerJoin, show::Relation::Venue.def())
        .order_by_asc(show::Column::StartTime)
        .into_model::<ShowListing>()
        .all(db)
        .await?)
}

/// The stored venue as an edit-form prefill.
pub async fn venue_form<C: ConnectionTrait>(
    db: &C,
    venue_id: Uuid,
) -> Result<VenueForm, DirectoryError> {
    let venue = venue::Entity::find_by_id(venue_id)
        .one(db)
        .await?
        .ok_or(DirectoryError::NotFound {
            kind: EntityKind::Venue,
            id: venue_id,
        })?;
    let genres = genres::venue_genres(db, venue_id).await?;
    Ok(VenueForm::from_model(venue, genres))
}

pub async fn artist_form<C: ConnectionTrait>(
    db: &C,
    artist_id: Uuid,
) -> Result<ArtistForm, DirectoryError> {
    let artist = artist::Entity::find_by_id(artist_id)
        .one(db)
        .await?
        .ok_or(DirectoryError::NotFound {
            kind: EntityKind::Artist,
            id: artist_id,
        })?;
    let genres = genres::artist_genres(db, artist_id).await?;
    Ok(ArtistForm::from_model(artist, genres))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().fixed_offset()
    }

    #[test]
    fn test_partition_is_strict_on_now() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        let rows = vec![at(2029, 6, 1, 20), at(2030, 1, 1, 12), at(2030, 1, 1, 13)];
        let split = partition_shows(rows, now, |t| *t);
        assert_eq!(split.past, vec![at(2029, 6, 1, 20), at(2030, 1, 1, 12)]);
        assert_eq!(split.upcoming, vec![at(2030, 1, 1, 13)]);
    }

    #[test]
    fn test_partition_compares_across_offsets() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        // 05:30 at -07:00 is 12:30 UTC
        let t = FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2030, 1, 1, 5, 30, 0)
            .unwrap();
        let split = partition_shows(vec![t], now, |t| *t);
        assert!(split.past.is_empty());
        assert_eq!(split.upcoming.len(), 1);
    }

    #[test]
    fn test_format_start_time_zeroes_seconds() {
        let t = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2019, 5, 21, 21, 30, 45)
            .unwrap();
        assert_eq!(format_start_time(t), "2019-05-21T20:30:00.000Z");
    }

    #[test]
    fn test_show_listing_serializes_formatted_time() {
        let listing = ShowListing {
            start_time: at(2035, 4, 1, 20),
            artist_id: Uuid::nil(),
            artist_name: "The Wild Sax Band".into(),
            artist_image_link: None,
            venue_id: Uuid::nil(),
            venue_name: "Park Square Live Music & Coffee".into(),
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["start_time"], "2035-04-01T20:00:00.000Z");
        assert_eq!(json["venue_name"], "Park Square Live Music & Coffee");
    }

    #[test]
    fn test_postgres_search_uses_ilike_with_escape() {
        let filter = name_filter(
            DbBackend::Postgres,
            Expr::col((venue::Entity, venue::Column::Name)).into(),
            "50%_off",
        )
        .unwrap();
        let sql = venue::Entity::find()
            .filter(filter)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("ILIKE"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(!sql.contains("LOWER"), "{sql}");
    }

    #[test]
    fn test_sqlite_search_matches_outside_sql() {
        let filter = name_filter(
            DbBackend::Sqlite,
            Expr::col((venue::Entity, venue::Column::Name)).into(),
            "café",
        );
        assert!(filter.is_none());

        let term = NameTerm::new(false, "café");
        assert!(term.matches("CAFÉ ÉLAN"));
        assert!(!term.matches("Cafe Elan"));
        assert!(NameTerm::new(true, "anything").matches("Cafe Elan"));
    }
}
