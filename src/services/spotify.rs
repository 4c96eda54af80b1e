// SPDX-License-Identifier: MIT

//! Spotify Web API client.
//!
//! One HTTP call per method: the caller supplies a valid bearer token and
//! this client performs no retry or refresh itself. Rate limits (429) are
//! classified into `AppError::RateLimited` with the upstream `Retry-After`
//! hint so callers can back off or surface the hint to the browser.

use crate::error::AppError;
use crate::models::spotify::{
    Album, Artist, ArtistsEnvelope, Page, SearchResponse, TokenResponse, Track, TracksEnvelope,
    UserProfile,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;

/// Default backoff hint when Spotify omits the Retry-After header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Spotify API client (api + accounts hosts).
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: String,
    accounts_base: String,
    client_id: String,
    client_secret: String,
}

impl SpotifyClient {
    /// Create a new client with OAuth app credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_base: "https://api.spotify.com/v1".to_string(),
            accounts_base: "https://accounts.spotify.com".to_string(),
            client_id,
            client_secret,
        }
    }

    // ─── OAuth (accounts host) ───────────────────────────────────

    /// Exchange an authorization code for access + refresh tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    /// Request a fresh access token for a refresh token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let credentials = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_base))
            .header("Authorization", format!("Basic {}", credentials))
            .form(form)
            .send()
            .await
            .map_err(request_error)?;

        check_response_json(response).await
    }

    // ─── Profile ─────────────────────────────────────────────────

    /// Authenticated user's profile (`/v1/me`).
    pub async fn me(&self, access_token: &str) -> Result<UserProfile, AppError> {
        self.get_json(access_token, format!("{}/me", self.api_base))
            .await
    }

    // ─── Listening history ───────────────────────────────────────

    /// Top tracks page, passed through unshaped.
    pub async fn top_tracks(
        &self,
        access_token: &str,
        time_range: &str,
        limit: u32,
    ) -> Result<serde_json::Value, AppError> {
        let url = format!(
            "{}/me/top/tracks?limit={}&time_range={}",
            self.api_base, limit, time_range
        );
        self.get_json(access_token, url).await
    }

    /// Recently played page, passed through unshaped.
    pub async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/me/player/recently-played?limit={}", self.api_base, limit);
        self.get_json(access_token, url).await
    }

    /// One page of the user's top artists.
    pub async fn top_artists(
        &self,
        access_token: &str,
        time_range: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Artist>, AppError> {
        let url = format!(
            "{}/me/top/artists?limit={}&offset={}&time_range={}",
            self.api_base, limit, offset, time_range
        );
        self.get_json(access_token, url).await
    }

    // ─── Artists ─────────────────────────────────────────────────

    /// Whether the user follows the given artist.
    pub async fn follows_artist(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<bool, AppError> {
        let url = format!(
            "{}/me/following/contains?type=artist&ids={}",
            self.api_base, artist_id
        );
        let flags: Vec<bool> = self.get_json(access_token, url).await?;
        Ok(flags.first().copied().unwrap_or(false))
    }

    pub async fn artist(&self, access_token: &str, artist_id: &str) -> Result<Artist, AppError> {
        self.get_json(access_token, format!("{}/artists/{}", self.api_base, artist_id))
            .await
    }

    pub async fn artist_top_tracks(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<Vec<Track>, AppError> {
        let url = format!(
            "{}/artists/{}/top-tracks?market=US",
            self.api_base, artist_id
        );
        let envelope: TracksEnvelope = self.get_json(access_token, url).await?;
        Ok(envelope.tracks)
    }

    pub async fn artist_albums(
        &self,
        access_token: &str,
        artist_id: &str,
        limit: u32,
    ) -> Result<Vec<Album>, AppError> {
        let url = format!(
            "{}/artists/{}/albums?limit={}&market=US",
            self.api_base, artist_id, limit
        );
        let page: Page<Album> = self.get_json(access_token, url).await?;
        Ok(page.items)
    }

    /// Several artists in one call.
    pub async fn artists(
        &self,
        access_token: &str,
        artist_ids: &[String],
    ) -> Result<Vec<Artist>, AppError> {
        let url = format!("{}/artists?ids={}", self.api_base, artist_ids.join(","));
        let envelope: ArtistsEnvelope = self.get_json(access_token, url).await?;
        Ok(envelope.artists)
    }

    // ─── Tracks & search ─────────────────────────────────────────

    /// Several tracks in one call.
    pub async fn tracks(
        &self,
        access_token: &str,
        track_ids: &[String],
    ) -> Result<Vec<Track>, AppError> {
        let url = format!("{}/tracks?ids={}", self.api_base, track_ids.join(","));
        let envelope: TracksEnvelope = self.get_json(access_token, url).await?;
        Ok(envelope.tracks)
    }

    /// Track search with a raw query expression.
    pub async fn search_tracks(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, AppError> {
        let url = format!(
            "{}/search?q={}&type=track&market=US&limit={}",
            self.api_base,
            urlencoding::encode(query),
            limit
        );
        let response: SearchResponse = self.get_json(access_token, url).await?;
        Ok(response.into_tracks())
    }

    // ─── Playlists ───────────────────────────────────────────────

    /// Create a private playlist under the given user.
    pub async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/users/{}/playlists", self.api_base, user_id);
        let body = serde_json::json!({
            "name": name,
            "description": "Playlist created by Statify",
            "public": false,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        check_response_json(response).await
    }

    /// Add tracks to a playlist.
    pub async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        track_uris: &[String],
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/playlists/{}/tracks", self.api_base, playlist_id);
        let body = serde_json::json!({ "uris": track_uris });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        check_response_json(response).await
    }

    /// Upload a base64-encoded JPEG as playlist cover art.
    pub async fn upload_playlist_cover(
        &self,
        access_token: &str,
        playlist_id: &str,
        image_base64: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/playlists/{}/images", self.api_base, playlist_id);

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .header("Content-Type", "image/jpeg")
            .body(image_base64.to_string())
            .send()
            .await
            .map_err(request_error)?;

        check_response(response).await
    }

    /// Full playlist object (used for cover image lookup).
    pub async fn playlist(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<serde_json::Value, AppError> {
        self.get_json(
            access_token,
            format!("{}/playlists/{}", self.api_base, playlist_id),
        )
        .await
    }

    // ─── Internals ───────────────────────────────────────────────

    /// Generic GET with bearer auth and JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        access_token: &str,
        url: String,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(request_error)?;

        check_response_json(response).await
    }
}

/// Transport failures surface as a 502-style upstream error.
fn request_error(err: reqwest::Error) -> AppError {
    AppError::SpotifyApi {
        status: 502,
        body: err.to_string(),
    }
}

/// Parse the Retry-After header, defaulting when absent or malformed.
pub fn parse_retry_after(header: Option<&str>) -> u64 {
    header
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Classify a non-success response into the error taxonomy.
async fn error_from_response(response: reqwest::Response) -> AppError {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after = parse_retry_after(
            response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok()),
        );
        tracing::warn!(retry_after, "Spotify rate limit hit (429)");
        return AppError::RateLimited { retry_after };
    }

    if status == 401 {
        return AppError::Unauthorized;
    }

    let body = response.text().await.unwrap_or_default();
    AppError::SpotifyApi { status, body }
}

async fn check_response(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(error_from_response(response).await)
}

async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    response.json().await.map_err(|e| AppError::SpotifyApi {
        status: 502,
        body: format!("JSON parse error: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retry_after_header() {
        assert_eq!(parse_retry_after(Some("12")), 12);
        assert_eq!(parse_retry_after(Some(" 7 ")), 7);
    }

    #[test]
    fn test_parse_retry_after_defaults() {
        assert_eq!(parse_retry_after(None), DEFAULT_RETRY_AFTER_SECS);
        assert_eq!(parse_retry_after(Some("soon")), DEFAULT_RETRY_AFTER_SECS);
    }
}
