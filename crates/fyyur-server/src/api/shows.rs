use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use super::{ApiError, Flash};
use fyyur_db::directory::{self, ShowListing};
use fyyur_db::forms::ShowForm;
use fyyur_db::{booking, AppState};

/// GET /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowListing>>, ApiError> {
    Ok(Json(directory::list_shows(&state.db).await?))
}

/// POST /shows/create
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ShowForm>,
) -> Result<(StatusCode, Json<Flash>), ApiError> {
    let booked = booking::create_show(&state.db, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(Flash::with_id(booked.message, booked.record)),
    ))
}
