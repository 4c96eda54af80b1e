// SPDX-License-Identifier: MIT

//! OAuth flow and cookie session tests, all network-free.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

#[tokio::test]
async fn test_login_redirects_to_spotify_authorize() {
    let app = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://accounts.spotify.com/authorize?"));
    assert!(location.contains("client_id=test_client_id"));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("state="));
    assert!(location.contains("user-top-read"));
}

#[tokio::test]
async fn test_login_sets_state_cookie() {
    let app = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("spotify_auth_state="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_callback_state_mismatch_redirects_with_error() {
    let app = common::create_test_app();

    // State cookie says one thing, query says another
    let response = app
        .oneshot(
            Request::builder()
                .uri("/callback?code=abc&state=attacker")
                .header(header::COOKIE, "spotify_auth_state=expected")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.ends_with("/#error=state_mismatch"));
}

#[tokio::test]
async fn test_callback_without_state_redirects_with_error() {
    let app = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/callback?code=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains("#error=state_mismatch"));
}

#[tokio::test]
async fn test_refresh_without_cookie_is_unauthorized() {
    let app = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_check_login_status_without_cookie() {
    let app = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/check-login-status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["isLoggedIn"], false);
}

#[tokio::test]
async fn test_logout_clears_session_cookies() {
    let app = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/logout")
                .header(header::COOKIE, "access_token=a; refresh_token=b")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let cleared: Vec<&str> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert!(cleared.iter().any(|c| c.starts_with("access_token=")));
    assert!(cleared.iter().any(|c| c.starts_with("refresh_token=")));
}
