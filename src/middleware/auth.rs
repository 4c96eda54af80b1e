// SPDX-License-Identifier: MIT

//! Cookie-based access token middleware.
//!
//! The Spotify access token lives in an http-only cookie set by the OAuth
//! callback. Routes behind this middleware fail fast with 401 when the
//! cookie is absent; token refresh is never attempted here (the client
//! calls the explicit refresh endpoint).

use crate::error::AppError;
use axum::{extract::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Bearer token extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

/// Middleware requiring a Spotify access token cookie.
pub async fn require_auth(
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) else {
        return Err(AppError::Unauthorized);
    };

    request
        .extensions_mut()
        .insert(AccessToken(cookie.value().to_string()));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest, StatusCode};
    use axum::{middleware, routing::get, Extension, Router};
    use tower::ServiceExt; // for oneshot

    fn test_app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(token): Extension<AccessToken>| async move { token.0 }),
            )
            .layer(middleware::from_fn(require_auth))
    }

    #[tokio::test]
    async fn test_missing_cookie_is_unauthorized() {
        let response = test_app()
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cookie_token_reaches_handler() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(header::COOKIE, "access_token=abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"abc123");
    }
}
