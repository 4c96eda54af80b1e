// SPDX-License-Identifier: MIT

//! Shared playlist feed backed by MongoDB.

use crate::error::{AppError, Result};
use crate::middleware::auth::AccessToken;
use crate::models::{NewPlaylist, Playlist, User};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(rename = "userID", default)]
    user_id: String,
    #[serde(rename = "displayName", default)]
    display_name: String,
    #[serde(default)]
    playlists: Vec<NewPlaylist>,
}

/// Publish one or more playlists to the shared feed.
pub async fn publish(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<serde_json::Value>> {
    if request.user_id.is_empty() || request.display_name.is_empty() {
        return Err(AppError::BadRequest(
            "User ID and display name are required".to_string(),
        ));
    }

    let created_at = chrono::Utc::now().to_rfc3339();
    let playlists: Vec<Playlist> = request
        .playlists
        .into_iter()
        .map(|p| Playlist {
            playlist_id: p.playlist_id,
            name: p.name,
            track_uris: p.track_uris,
            created_at: created_at.clone(),
            image_base64: p.image_base64,
            user_id: request.user_id.clone(),
        })
        .collect();

    let added = state
        .db
        .upsert_playlists(&request.user_id, &request.display_name, playlists)
        .await?;

    tracing::info!(user = %request.user_id, added, "Playlists published to feed");
    Ok(Json(json!({ "message": "Playlists added to feed" })))
}

/// Every user's published playlists.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = state.db.list_feed().await?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(rename = "userID", default)]
    user_id: String,
}

/// Remove a playlist from the feed. Ownership is checked against the
/// session's Spotify profile, not the query parameter alone.
pub async fn delete_playlist(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Path(playlist_id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>> {
    let profile = state.spotify.me(&token).await?;
    if profile.id != query.user_id {
        return Err(AppError::Forbidden(
            "You can only delete your own playlists".to_string(),
        ));
    }

    state.db.delete_playlist(&query.user_id, &playlist_id).await?;
    Ok(Json(json!({ "message": "Playlist deleted" })))
}
