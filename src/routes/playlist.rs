// SPDX-License-Identifier: MIT

//! Playlist creation, cover upload, and gradient cover-art generation.

use crate::error::{AppError, Result};
use crate::middleware::auth::AccessToken;
use crate::services::gradient::{self, GradientMaker, DEFAULT_SIZE};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::header::{self, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "playlistName")]
    playlist_name: Option<String>,
}

pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Json(request): Json<CreatePlaylistRequest>,
) -> Result<Json<serde_json::Value>> {
    if request.user_id.is_empty() {
        return Err(AppError::BadRequest("User ID is required".to_string()));
    }

    let name = request
        .playlist_name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "New Playlist".to_string());

    let playlist = state
        .spotify
        .create_playlist(&token, &request.user_id, &name)
        .await?;
    Ok(Json(playlist))
}

#[derive(Debug, Deserialize)]
pub struct AddTracksRequest {
    #[serde(rename = "playlistId", default)]
    playlist_id: String,
    #[serde(rename = "trackUris", default)]
    track_uris: Vec<String>,
}

pub async fn add_tracks(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Json(request): Json<AddTracksRequest>,
) -> Result<Json<serde_json::Value>> {
    // Validate before touching the upstream API
    if request.playlist_id.is_empty() || request.track_uris.is_empty() {
        return Err(AppError::BadRequest(
            "Playlist ID and track URIs are required".to_string(),
        ));
    }

    let snapshot = state
        .spotify
        .add_tracks(&token, &request.playlist_id, &request.track_uris)
        .await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct UpdateImageRequest {
    #[serde(rename = "imageBase64", default)]
    image_base64: String,
}

/// Upload a JPEG cover to a playlist. Accepts either a bare base64 string
/// or a `data:image/jpeg;base64,` data URL.
pub async fn update_playlist_image(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Path(playlist_id): Path<String>,
    Json(request): Json<UpdateImageRequest>,
) -> Result<Json<serde_json::Value>> {
    if request.image_base64.is_empty() {
        return Err(AppError::BadRequest("Image data is required".to_string()));
    }

    // Confirms the token is still live before the PUT, which Spotify
    // rejects with an opaque error otherwise.
    state.spotify.me(&token).await?;

    let payload = strip_data_url_prefix(&request.image_base64);
    state
        .spotify
        .upload_playlist_cover(&token, &playlist_id, payload)
        .await?;

    Ok(Json(json!({ "message": "Playlist image updated" })))
}

pub async fn playlist_image(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
    Path(playlist_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let playlist = state.spotify.playlist(&token, &playlist_id).await?;
    let images = playlist.get("images").cloned().unwrap_or(json!([]));
    Ok(Json(json!({ "images": images })))
}

fn strip_data_url_prefix(input: &str) -> &str {
    match input.split_once(',') {
        Some((_, payload)) => payload,
        None => input,
    }
}

// ─── Gradient cover art ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GradientColorsRequest {
    #[serde(default)]
    genres: Vec<String>,
}

/// Ask the mood-color model for three hex colors matching three genres.
pub async fn generate_gradient_colors(
    State(state): State<AppState>,
    Json(request): Json<GradientColorsRequest>,
) -> Result<Json<serde_json::Value>> {
    if request.genres.len() != 3 {
        return Err(AppError::BadRequest(
            "Exactly three genres are required".to_string(),
        ));
    }

    let colors = state.mood_colors.generate_colors(&request.genres).await?;
    Ok(Json(json!({ "colors": colors })))
}

#[derive(Debug, Deserialize)]
pub struct GenerateGradientsRequest {
    #[serde(default)]
    color1: String,
    #[serde(default)]
    color2: String,
    #[serde(default)]
    color3: String,
    size: Option<u32>,
}

/// Render radial and conic gradient JPEGs for three colors, store them
/// briefly, and return fetchable URLs plus the CSS form.
pub async fn generate_gradients(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateGradientsRequest>,
) -> Result<Json<serde_json::Value>> {
    let c1 = gradient::parse_hex(&request.color1)?;
    let c2 = gradient::parse_hex(&request.color2)?;
    let c3 = gradient::parse_hex(&request.color3)?;

    let maker = GradientMaker::new(request.size.unwrap_or(DEFAULT_SIZE));

    // Rasterizing two large JPEGs is CPU-bound; keep it off the async workers
    let set = tokio::task::spawn_blocking(move || maker.generate(c1, c2, c3))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Gradient render task failed: {}", e)))??;

    let id = gradient_id();
    state.gradients.insert(&format!("{}-radial", id), set.radial_jpeg);
    state.gradients.insert(&format!("{}-conic", id), set.conic_jpeg);

    let base = request_base_url(&headers);
    Ok(Json(json!({
        "radialUrl": format!("{}/gradients/{}-radial", base, id),
        "conicUrl": format!("{}/gradients/{}-conic", base, id),
        "cssGradient": set.css_gradient,
        "colorStops": set.color_stops,
    })))
}

pub async fn get_gradient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let bytes = state
        .gradients
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Gradient not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

/// Timestamp plus a random suffix; two renders in the same millisecond
/// must not overwrite each other's buffers.
fn gradient_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// Base URL for returned links, derived from the Host header. Local
/// development runs without TLS.
fn request_base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8888");
    let scheme = if host.starts_with("localhost") || host.starts_with("127.0.0.1") {
        "http"
    } else {
        "https"
    };
    format!("{}://{}", scheme, host)
}
