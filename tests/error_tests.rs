// SPDX-License-Identifier: MIT

//! Error-to-response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;
use statify::error::AppError;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_unauthorized_maps_to_401() {
    let (status, body) = render(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_forbidden_maps_to_403() {
    let (status, body) = render(AppError::Forbidden(
        "You can only delete your own playlists".to_string(),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can only delete your own playlists");
}

#[tokio::test]
async fn test_not_found_maps_to_404() {
    let (status, body) = render(AppError::NotFound("No artists found".to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No artists found");
}

#[tokio::test]
async fn test_rate_limited_carries_retry_hint() {
    let (status, body) = render(AppError::RateLimited { retry_after: 30 }).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["retryAfter"], 30);
}

#[tokio::test]
async fn test_upstream_status_passes_through() {
    let (status, _) = render(AppError::SpotifyApi {
        status: 503,
        body: "upstream down".to_string(),
    })
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_internal_error_hides_details() {
    let (status, body) = render(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_ne!(body["error"], "secret detail");
}
