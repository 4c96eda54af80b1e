// SPDX-License-Identifier: MIT

//! Spotify OAuth authorization-code flow with cookie sessions.

use crate::error::AppError;
use crate::middleware::auth::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;

/// Short-lived CSRF state carried across the authorization redirect.
const STATE_COOKIE: &str = "spotify_auth_state";
const STATE_LENGTH: usize = 16;

/// Every permission the frontend needs; requested up front so later
/// features never force a re-consent.
const SCOPE: &str = "user-read-private user-read-email user-read-recently-played \
                     user-top-read playlist-modify-public playlist-modify-private \
                     ugc-image-upload user-follow-read";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/refresh-token", post(refresh_token))
        .route("/check-login-status", get(check_login_status))
        .route("/logout", get(logout))
}

fn access_cookie(token: String) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(1))
        .build()
}

fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(7))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

fn random_state() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Redirect to Spotify's consent page with a fresh CSRF state.
async fn login(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let auth_state = random_state();

    let url = format!(
        "https://accounts.spotify.com/authorize?response_type=code&client_id={}&scope={}&redirect_uri={}&state={}&show_dialog=true",
        state.config.spotify_client_id,
        urlencoding::encode(SCOPE),
        urlencoding::encode(&state.config.redirect_uri),
        auth_state,
    );

    let jar = jar.add(
        Cookie::build((STATE_COOKIE, auth_state))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    );

    (jar, Redirect::temporary(&url))
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

/// Authorization callback: verify state, exchange the code, set session
/// cookies. Failures redirect back to the frontend with an error fragment.
async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> (CookieJar, Redirect) {
    let frontend = &state.config.frontend_url;

    let stored_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    if query.state.is_none() || query.state != stored_state {
        tracing::warn!("OAuth callback state mismatch");
        return (
            jar,
            Redirect::temporary(&format!("{}/#error=state_mismatch", frontend)),
        );
    }

    let jar = jar.remove(removal_cookie(STATE_COOKIE));

    let code = query.code.unwrap_or_default();
    match state
        .spotify
        .exchange_code(&code, &state.config.redirect_uri)
        .await
    {
        Ok(tokens) => {
            tracing::info!("OAuth code exchange succeeded");
            let jar = jar
                .add(access_cookie(tokens.access_token))
                .add(refresh_cookie(tokens.refresh_token.unwrap_or_default()));
            (jar, Redirect::temporary(frontend))
        }
        Err(err) => {
            tracing::warn!(error = %err, "OAuth code exchange failed");
            (
                jar,
                Redirect::temporary(&format!("{}/#error=invalid_token", frontend)),
            )
        }
    }
}

/// Mint a fresh access token from the refresh cookie.
async fn refresh_token(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(refresh) = jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()) else {
        return AppError::Unauthorized.into_response();
    };

    match state.spotify.refresh_token(&refresh).await {
        Ok(tokens) => {
            let next_refresh = tokens.refresh_token.unwrap_or(refresh);
            let jar = jar
                .add(access_cookie(tokens.access_token))
                .add(refresh_cookie(next_refresh));
            (jar, Json(json!({ "success": true }))).into_response()
        }
        Err(err) => {
            // A failed refresh means the session is gone; clear both cookies
            // so the client falls back to a fresh login.
            tracing::warn!(error = %err, "Token refresh failed, clearing session");
            let jar = jar
                .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
                .remove(removal_cookie(REFRESH_TOKEN_COOKIE));
            (jar, AppError::Unauthorized.into_response()).into_response()
        }
    }
}

/// Report whether the session cookie still resolves to a Spotify profile.
async fn check_login_status(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Json<serde_json::Value> {
    let Some(token) = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()) else {
        return Json(json!({ "isLoggedIn": false }));
    };

    match state.spotify.me(&token).await {
        Ok(profile) => Json(json!({
            "isLoggedIn": true,
            "user": {
                "id": profile.id,
                "displayName": profile.display_name,
            },
        })),
        Err(_) => Json(json!({ "isLoggedIn": false })),
    }
}

async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(REFRESH_TOKEN_COOKIE));
    (jar, Redirect::temporary("/"))
}
