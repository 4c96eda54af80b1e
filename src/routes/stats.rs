// SPDX-License-Identifier: MIT

//! Listening-stats endpoints: profile, top tracks, top artists, artist detail.

use crate::cache;
use crate::error::Result;
use crate::middleware::auth::AccessToken;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

/// Straight proxy responses stay cached briefly per credential.
const PROXY_CACHE_TTL_SECS: i64 = 300;

pub async fn user_profile(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
) -> Result<Json<serde_json::Value>> {
    let profile = state.spotify.me(&token).await?;
    Ok(Json(json!({
        "id": profile.id,
        "displayName": profile.display_name,
    })))
}

#[derive(Debug, Deserialize)]
pub struct TopTracksQuery {
    #[serde(default = "default_time_range")]
    time_range: String,
}

fn default_time_range() -> String {
    "short_term".to_string()
}

pub async fn top_tracks(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Query(query): Query<TopTracksQuery>,
) -> Result<Json<serde_json::Value>> {
    let key = cache::user_key("top-tracks", &token, &query.time_range);
    if let Some(cached) = state.cache.get(&key) {
        return Ok(Json(cached));
    }

    let page = state.spotify.top_tracks(&token, &query.time_range, 20).await?;
    state.cache.set(&key, page.clone(), PROXY_CACHE_TTL_SECS);
    Ok(Json(page))
}

pub async fn recently_played(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
) -> Result<Json<serde_json::Value>> {
    let key = cache::user_key("recently-played", &token, "20");
    if let Some(cached) = state.cache.get(&key) {
        return Ok(Json(cached));
    }

    let page = state.spotify.recently_played(&token, 20).await?;
    state.cache.set(&key, page.clone(), PROXY_CACHE_TTL_SECS);
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct TopArtistsQuery {
    #[serde(default = "default_time_range")]
    time_range: String,
    #[serde(default)]
    offset: u32,
    #[serde(default = "default_artist_limit")]
    limit: u32,
}

fn default_artist_limit() -> u32 {
    15
}

pub async fn top_artists(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Query(query): Query<TopArtistsQuery>,
) -> Result<Json<serde_json::Value>> {
    let items = state
        .aggregator
        .top_artists(&token, &query.time_range, query.offset, query.limit)
        .await?;
    Ok(Json(json!({ "items": items })))
}

pub async fn artist_recommendations(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Path(artist_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let tracks = state
        .aggregator
        .artist_recommendations(&token, &artist_id)
        .await?;
    Ok(Json(json!({ "tracks": tracks })))
}

pub async fn artist_detail(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Path(artist_id): Path<String>,
) -> Result<Json<crate::models::ArtistDetail>> {
    let detail = state.aggregator.artist_detail(&token, &artist_id).await?;
    Ok(Json(detail))
}
