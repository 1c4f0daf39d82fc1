//! Write side. Every operation runs in its own transaction on the handle it
//! is given: commit on success, explicit rollback on failure. The
//! transaction is owned by the operation's scope, so it is released on every
//! exit path; dropping it uncommitted rolls it back.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{artist, show, venue};
use crate::error::{Action, BookingError, EntityKind, StatusMessage};
use crate::forms::{ArtistForm, ShowForm, VenueForm};
use crate::genres;

/// A committed mutation plus its success banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booked<T> {
    pub record: T,
    pub message: StatusMessage,
}

/// Who and what to name when an operation fails.
struct Target {
    kind: EntityKind,
    action: Action,
    name: Option<String>,
}

impl Target {
    fn new(kind: EntityKind, action: Action, name: Option<&str>) -> Self {
        Self {
            kind,
            action,
            name: name.map(str::to_owned),
        }
    }

    fn failed(self, source: DbErr) -> BookingError {
        tracing::error!(
            kind = %self.kind,
            action = %self.action,
            name = ?self.name,
            error = %source,
            "mutation failed"
        );
        BookingError::Failed {
            kind: self.kind,
            action: self.action,
            name: self.name,
            source,
        }
    }

    fn booked<T>(self, record: T) -> Booked<T> {
        tracing::info!(
            kind = %self.kind,
            action = %self.action,
            name = ?self.name,
            "mutation committed"
        );
        Booked {
            message: StatusMessage::success(self.kind, self.name.as_deref(), self.action),
            record,
        }
    }
}

async fn begin(
    db: &DatabaseConnection,
    target: Target,
) -> Result<(DatabaseTransaction, Target), BookingError> {
    match db.begin().await {
        Ok(txn) => Ok((txn, target)),
        Err(e) => Err(target.failed(e)),
    }
}

/// Commit `result`'s writes, or roll them back if it failed.
async fn finish<T>(
    txn: DatabaseTransaction,
    target: Target,
    result: Result<T, DbErr>,
) -> Result<Booked<T>, BookingError> {
    match result {
        Ok(record) => match txn.commit().await {
            Ok(()) => Ok(target.booked(record)),
            Err(e) => Err(target.failed(e)),
        },
        Err(e) => {
            if let Err(rb) = txn.rollback().await {
                tracing::warn!(error = %rb, "rollback failed");
            }
            Err(target.failed(e))
        }
    }
}

async fn abandon(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        tracing::warn!(error = %e, "rollback failed");
    }
}

/// Insert a venue and its genres. No redirect target is implied; the caller
/// decides where to go next.
pub async fn create_venue(
    db: &DatabaseConnection,
    form: VenueForm,
) -> Result<Booked<Uuid>, BookingError> {
    let target = Target::new(EntityKind::Venue, Action::Listed, Some(&form.name));
    let (txn, target) = begin(db, target).await?;

    let id = Uuid::new_v4();
    let result: Result<Uuid, DbErr> = async {
        let (model, genre_names) = form.into_active_model(id);
        model.insert(&txn).await?;
        genres::replace_venue_genres(&txn, id, genre_names).await?;
        Ok(id)
    }
    .await;

    finish(txn, target, result).await
}

pub async fn create_artist(
    db: &DatabaseConnection,
    form: ArtistForm,
) -> Result<Booked<Uuid>, BookingError> {
    let target = Target::new(EntityKind::Artist, Action::Listed, Some(&form.name));
    let (txn, target) = begin(db, target).await?;

    let id = Uuid::new_v4();
    let result: Result<Uuid, DbErr> = async {
        let (model, genre_names) = form.into_active_model(id);
        model.insert(&txn).await?;
        genres::replace_artist_genres(&txn, id, genre_names).await?;
        Ok(id)
    }
    .await;

    finish(txn, target, result).await
}

/// Full replace of every mutable venue field, genres included.
pub async fn update_venue(
    db: &DatabaseConnection,
    id: Uuid,
    form: VenueForm,
) -> Result<Booked<Uuid>, BookingError> {
    let target = Target::new(EntityKind::Venue, Action::Edited, Some(&form.name));
    let (txn, target) = begin(db, target).await?;

    let existing = match venue::Entity::find_by_id(id).one(&txn).await {
        Ok(found) => found,
        Err(e) => return finish(txn, target, Err(e)).await,
    };
    if existing.is_none() {
        abandon(txn).await;
        return Err(BookingError::NotFound {
            kind: EntityKind::Venue,
            id,
        });
    }

    let result: Result<Uuid, DbErr> = async {
        let (model, genre_names) = form.into_active_model(id);
        model.update(&txn).await?;
        genres::replace_venue_genres(&txn, id, genre_names).await?;
        Ok(id)
    }
    .await;

    finish(txn, target, result).await
}

pub async fn update_artist(
    db: &DatabaseConnection,
    id: Uuid,
    form: ArtistForm,
) -> Result<Booked<Uuid>, BookingError> {
    let target = Target::new(EntityKind::Artist, Action::Edited, Some(&form.name));
    let (txn, target) = begin(db, target).await?;

    let existing = match artist::Entity::find_by_id(id).one(&txn).await {
        Ok(found) => found,
        Err(e) => return finish(txn, target, Err(e)).await,
    };
    if existing.is_none() {
        abandon(txn).await;
        return Err(BookingError::NotFound {
            kind: EntityKind::Artist,
            id,
        });
    }

    let result: Result<Uuid, DbErr> = async {
        let (model, genre_names) = form.into_active_model(id);
        model.update(&txn).await?;
        genres::replace_artist_genres(&txn, id, genre_names).await?;
        Ok(id)
    }
    .await;

    finish(txn, target, result).await
}

/// Delete by filter. A missing id is a successful no-op; the record is the
/// number of venue rows removed. Shows and genres go with it by cascade.
pub async fn delete_venue(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Booked<u64>, BookingError> {
    let target = Target::new(EntityKind::Venue, Action::Deleted, None);
    let (txn, target) = begin(db, target).await?;

    let result = venue::Entity::delete_many()
        .filter(venue::Column::Id.eq(id))
        .exec(&txn)
        .await
        .map(|res| res.rows_affected);

    finish(txn, target, result).await
}

/// Insert a show. Parent ids are not checked up front; the foreign keys
/// reject dangling references and the insert rolls back.
pub async fn create_show(
    db: &DatabaseConnection,
    form: ShowForm,
) -> Result<Booked<Uuid>, BookingError> {
    let target = Target::new(EntityKind::Show, Action::Listed, None);
    let (txn, target) = begin(db, target).await?;

    let id = Uuid::new_v4();
    let result = show::Entity::insert(form.into_active_model(id))
        .exec_without_returning(&txn)
        .await
        .map(|_| id);

    finish(txn, target, result).await
}
