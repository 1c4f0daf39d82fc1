pub mod artists;
pub mod shows;
pub mod venues;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fyyur_db::{AppState, BookingError, DirectoryError, StatusMessage};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// All directory routes. Layers (tracing, CORS, headers) are added in `main`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/venues", get(venues::list_venues))
        .route("/venues/search", post(venues::search_venues))
        .route("/venues/create", post(venues::create_venue))
        .route(
            "/venues/{id}",
            get(venues::get_venue).delete(venues::delete_venue),
        )
        .route(
            "/venues/{id}/edit",
            get(venues::edit_venue_form).post(venues::update_venue),
        )
        .route("/artists", get(artists::list_artists))
        .route("/artists/search", post(artists::search_artists))
        .route("/artists/create", post(artists::create_artist))
        .route("/artists/{id}", get(artists::get_artist))
        .route(
            "/artists/{id}/edit",
            get(artists::edit_artist_form).post(artists::update_artist),
        )
        .route("/shows", get(shows::list_shows))
        .route("/shows/create", post(shows::create_show))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: fyyur_db::directory::SearchResults,
    pub search_term: String,
}

/// Banner plus whatever the mutation produced.
#[derive(Debug, Serialize)]
pub struct Flash {
    pub message: StatusMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
}

impl Flash {
    pub fn with_id(message: StatusMessage, id: Uuid) -> Self {
        Self {
            message,
            id: Some(id),
            deleted: None,
        }
    }
}

/// Error response: 404 for missing ids, 422 for a rolled-back mutation,
/// 500 for anything the read side could not handle.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DirectoryError> for ApiError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::NotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                body: json!({ "error": "not found" }),
            },
            DirectoryError::Storage(err) => {
                tracing::error!(error = %err, "query failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: json!({ "error": "internal server error" }),
                }
            }
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        let status = match e {
            BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
            BookingError::Failed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            body: json!({ "message": e.status_message() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
