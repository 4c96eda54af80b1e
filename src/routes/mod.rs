// SPDX-License-Identifier: MIT

//! Router assembly: public routes, cookie-gated routes, CORS, and tracing.

pub mod auth;
pub mod feed;
pub mod playlist;
pub mod recommend;
pub mod stats;

use crate::middleware::{auth::require_auth, security::add_security_headers};
use crate::AppState;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post, put};
use axum::{middleware, Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Credentialed CORS requires exact origins, so the allow list is a
/// predicate over the configured frontend plus local development hosts.
fn cors_layer(frontend_url: String) -> CorsLayer {
    let allow = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        origin == frontend_url
            || origin == "https://accounts.spotify.com"
            || origin.starts_with("http://localhost")
            || origin.starts_with("http://127.0.0.1")
    });

    CorsLayer::new()
        .allow_origin(allow)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
}

pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes())
        .route("/feed", get(feed::list).post(feed::publish))
        .route(
            "/generate-gradient-colors",
            post(playlist::generate_gradient_colors),
        )
        .route(
            "/gradients/generate-gradients",
            post(playlist::generate_gradients),
        )
        .route("/gradients/{id}", get(playlist::get_gradient));

    let protected = Router::new()
        .route("/user-profile", get(stats::user_profile))
        .route("/top-tracks", get(stats::top_tracks))
        .route("/recently-played", get(stats::recently_played))
        .route("/top-artists", get(stats::top_artists))
        .route(
            "/artist-recommendations/{artistId}",
            get(stats::artist_recommendations),
        )
        .route("/artist/{id}", get(stats::artist_detail))
        .route("/get-recommendations", post(recommend::get_recommendations))
        .route("/get-track-genres", post(recommend::get_track_genres))
        .route("/create-playlist", post(playlist::create_playlist))
        .route("/add-tracks", post(playlist::add_tracks))
        .route(
            "/update-playlist-image/{playlistId}",
            put(playlist::update_playlist_image),
        )
        .route("/playlist-image/{playlistId}", get(playlist::playlist_image))
        .route("/feed/playlist/{playlistId}", delete(feed::delete_playlist))
        .route_layer(middleware::from_fn(require_auth));

    public
        .merge(protected)
        .layer(middleware::from_fn(add_security_headers))
        .layer(cors_layer(state.config.frontend_url.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
