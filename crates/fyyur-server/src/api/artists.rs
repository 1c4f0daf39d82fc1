use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, Flash, SearchForm, SearchResponse};
use fyyur_db::directory::{self, ArtistDetail, ArtistListing};
use fyyur_db::forms::ArtistForm;
use fyyur_db::{booking, AppState};

/// GET /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtistListing>>, ApiError> {
    Ok(Json(directory::list_artists(&state.db).await?))
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SearchForm>,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = directory::search_artists(&state.db, &form.search_term).await?;
    Ok(Json(SearchResponse {
        results,
        search_term: form.search_term,
    }))
}

/// GET /artists/{id}
pub async fn get_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArtistDetail>, ApiError> {
    Ok(Json(directory::get_artist_detail(&state.db, id).await?))
}

/// POST /artists/create
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ArtistForm>,
) -> Result<(StatusCode, Json<Flash>), ApiError> {
    let booked = booking::create_artist(&state.db, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(Flash::with_id(booked.message, booked.record)),
    ))
}

/// GET /artists/{id}/edit
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArtistForm>, ApiError> {
    Ok(Json(directory::artist_form(&state.db, id).await?))
}

/// POST /artists/{id}/edit
pub async fn update_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(form): Json<ArtistForm>,
) -> Result<Json<Flash>, ApiError> {
    let booked = booking::update_artist(&state.db, id, form).await?;
    Ok(Json(Flash::with_id(booked.message, booked.record)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_list_and_search() {
        let app = TestApp::new().await;
        for name in ["Guns N Petals", "Matt Quevedo", "The Wild Sax Band"] {
            let (status, _) = app
                .send("POST", "/artists/create", Some(json!({ "name": name })))
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, list) = app.send("GET", "/artists", None).await;
        assert_eq!(list.as_array().unwrap().len(), 3);
        assert_eq!(list[0]["name"], "Guns N Petals");

        let (_, body) = app
            .send("POST", "/artists/search", Some(json!({ "search_term": "band" })))
            .await;
        assert_eq!(body["results"]["count"], 1);
        assert_eq!(body["results"]["data"][0]["name"], "The Wild Sax Band");
        assert_eq!(body["results"]["data"][0]["num_upcoming_shows"], 0);
    }

    #[tokio::test]
    async fn test_detail_edit_and_not_found() {
        let app = TestApp::new().await;
        let (_, created) = app
            .send(
                "POST",
                "/artists/create",
                Some(json!({ "name": "Guns N Petals", "genres": ["Rock n Roll"] })),
            )
            .await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, detail) = app.send("GET", &format!("/artists/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["genres"], json!(["Rock n Roll"]));
        assert_eq!(detail["seeking_venue"], false);
        assert_eq!(detail["past_shows_count"], 0);

        let (status, body) = app
            .send(
                "POST",
                &format!("/artists/{id}/edit"),
                Some(json!({ "name": "Guns N Petals", "seeking_venue": true })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"]["text"], "Artist Guns N Petals was successfully edited!");

        let (_, form) = app.send("GET", &format!("/artists/{id}/edit"), None).await;
        assert_eq!(form["seeking_venue"], true);
        assert_eq!(form["genres"], json!([]));

        let missing = uuid::Uuid::new_v4();
        let (status, body) = app.send("GET", &format!("/artists/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found");
    }

    #[tokio::test]
    async fn test_artists_have_no_delete_route() {
        let app = TestApp::new().await;
        let id = uuid::Uuid::new_v4();
        let (status, _) = app.send("DELETE", &format!("/artists/{id}"), None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
