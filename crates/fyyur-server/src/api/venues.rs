use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, Flash, SearchForm, SearchResponse};
use fyyur_db::directory::{self, CityVenues, VenueDetail};
use fyyur_db::forms::VenueForm;
use fyyur_db::{booking, AppState};

/// GET /venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CityVenues>>, ApiError> {
    Ok(Json(directory::list_venues_grouped_by_city(&state.db).await?))
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SearchForm>,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = directory::search_venues(&state.db, &form.search_term).await?;
    Ok(Json(SearchResponse {
        results,
        search_term: form.search_term,
    }))
}

/// GET /venues/{id}
pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<VenueDetail>, ApiError> {
    Ok(Json(directory::get_venue_detail(&state.db, id).await?))
}

/// POST /venues/create
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    Json(form): Json<VenueForm>,
) -> Result<(StatusCode, Json<Flash>), ApiError> {
    let booked = booking::create_venue(&state.db, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(Flash::with_id(booked.message, booked.record)),
    ))
}

/// GET /venues/{id}/edit
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<VenueForm>, ApiError> {
    Ok(Json(directory::venue_form(&state.db, id).await?))
}

/// POST /venues/{id}/edit
pub async fn update_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(form): Json<VenueForm>,
) -> Result<Json<Flash>, ApiError> {
    let booked = booking::update_venue(&state.db, id, form).await?;
    Ok(Json(Flash::with_id(booked.message, booked.record)))
}

/// DELETE /venues/{id}
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flash>, ApiError> {
    let booked = booking::delete_venue(&state.db, id).await?;
    Ok(Json(Flash {
        message: booked.message,
        id: None,
        deleted: Some(booked.record),
    }))
}
