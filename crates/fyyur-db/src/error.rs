//! Error taxonomy and the status-banner side channel.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Venue,
    Artist,
    Show,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Venue => "Venue",
            Self::Artist => "Artist",
            Self::Show => "Show",
        })
    }
}

/// What a mutation was doing, in the words used by the banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Listed,
    Edited,
    Deleted,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Listed => "listed",
            Self::Edited => "edited",
            Self::Deleted => "deleted",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Error,
}

/// Human-readable banner for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn success(kind: EntityKind, name: Option<&str>, action: Action) -> Self {
        Self {
            level: StatusLevel::Success,
            text: format!("{} was successfully {action}!", subject(kind, name)),
        }
    }

    pub fn failure(kind: EntityKind, name: Option<&str>, action: Action) -> Self {
        Self {
            level: StatusLevel::Error,
            text: format!(
                "An error occurred. {} could not be {action}.",
                subject(kind, name)
            ),
        }
    }
}

fn subject(kind: EntityKind, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{kind} {name}"),
        None => kind.to_string(),
    }
}

fn failure_text(kind: &EntityKind, name: &Option<String>, action: &Action) -> String {
    StatusMessage::failure(*kind, name.as_deref(), *action).text
}

/// Errors crossing the mutation boundary. Raw storage errors never escape
/// on their own; they ride along as the `source` of `Failed`.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("{}", failure_text(.kind, .name, .action))]
    Failed {
        kind: EntityKind,
        action: Action,
        name: Option<String>,
        #[source]
        source: sea_orm::DbErr,
    },
}

impl BookingError {
    pub fn status_message(&self) -> StatusMessage {
        match self {
            Self::NotFound { kind, .. } => StatusMessage {
                level: StatusLevel::Error,
                text: format!("{kind} not found."),
            },
            Self::Failed {
                kind, action, name, ..
            } => StatusMessage::failure(*kind, name.as_deref(), *action),
        }
    }
}

/// Errors from the read side.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("database error: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_success_banner_names_entity() {
        let msg = StatusMessage::success(EntityKind::Venue, Some("The Musical Hop"), Action::Listed);
        assert_eq!(msg.level, StatusLevel::Success);
        assert_eq!(msg.text, "Venue The Musical Hop was successfully listed!");
    }

    #[test]
    fn test_failure_banner_without_name() {
        let msg = StatusMessage::failure(EntityKind::Show, None, Action::Listed);
        assert_eq!(msg.text, "An error occurred. Show could not be listed.");
    }

    #[test]
    fn test_failed_display_matches_banner() {
        let err = BookingError::Failed {
            kind: EntityKind::Artist,
            action: Action::Edited,
            name: Some("Guns N Petals".into()),
            source: DbErr::Custom("boom".into()),
        };
        assert_eq!(
            err.to_string(),
            "An error occurred. Artist Guns N Petals could not be edited."
        );
        assert_eq!(err.status_message().level, StatusLevel::Error);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_not_found_banner() {
        let err = BookingError::NotFound {
            kind: EntityKind::Venue,
            id: Uuid::nil(),
        };
        assert_eq!(err.status_message().text, "Venue not found.");
    }

    #[test]
    fn test_directory_error_from_db_err() {
        let err: DirectoryError = DbErr::Custom("gone".into()).into();
        assert!(matches!(err, DirectoryError::Storage(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_status_message_serialization() {
        let msg = StatusMessage::success(EntityKind::Show, None, Action::Listed);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["text"], "Show was successfully listed!");
    }
}
