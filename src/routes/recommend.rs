// SPDX-License-Identifier: MIT

//! Recommendation endpoints driven by the caller's listening history.

use crate::error::{AppError, Result};
use crate::middleware::auth::AccessToken;
use crate::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct RecommendationsRequest {
    #[serde(rename = "topTracks", default)]
    top_tracks: Vec<String>,
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Json(request): Json<RecommendationsRequest>,
) -> Result<Json<serde_json::Value>> {
    if request.top_tracks.is_empty() {
        return Err(AppError::BadRequest("Top tracks are required".to_string()));
    }

    let tracks = state
        .aggregator
        .recommend_from_history(&token, &request.top_tracks)
        .await?;
    Ok(Json(json!({ "tracks": tracks })))
}

#[derive(Debug, Deserialize)]
pub struct TrackGenresRequest {
    #[serde(rename = "trackURIs", default)]
    track_uris: Vec<String>,
}

pub async fn get_track_genres(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Json(request): Json<TrackGenresRequest>,
) -> Result<Json<serde_json::Value>> {
    if request.track_uris.is_empty() {
        return Err(AppError::BadRequest("Track URIs are required".to_string()));
    }

    let genres = state
        .aggregator
        .track_genres(&token, &request.track_uris)
        .await?;
    Ok(Json(json!({ "genres": genres })))
}
