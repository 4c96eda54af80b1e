// SPDX-License-Identifier: MIT

//! Spotify Web API payload types.
//!
//! Deliberately partial: only the fields this service reads. Unknown fields
//! are ignored and most optional fields default so catalog quirks (missing
//! ids on local tracks, empty image arrays) never fail deserialization.

use serde::{Deserialize, Serialize};

/// Token endpoint response (authorization code and refresh grants).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Absent on refresh when Spotify does not rotate the refresh token.
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// `/v1/me` profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

/// Generic paginated wrapper (`items` is all we use).
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

/// Full artist object (top-artists page, `/v1/artists/{id}`).
#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub images: Vec<Image>,
    pub uri: Option<String>,
}

/// Simplified artist embedded in tracks.
#[derive(Debug, Clone, Deserialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub album: Album,
    #[serde(default)]
    pub duration_ms: u64,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl Track {
    /// Primary (first-listed) artist id, when Spotify provides one.
    pub fn primary_artist_id(&self) -> Option<&str> {
        self.artists.first().and_then(|a| a.id.as_deref())
    }
}

/// `{"tracks": [...]}` wrapper (artist top-tracks, tracks-by-ids).
#[derive(Debug, Clone, Deserialize)]
pub struct TracksEnvelope {
    #[serde(default = "Vec::new")]
    pub tracks: Vec<Track>,
}

/// `{"artists": [...]}` wrapper (artists-by-ids).
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistsEnvelope {
    #[serde(default = "Vec::new")]
    pub artists: Vec<Artist>,
}

/// `/v1/search?type=track` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<Page<Track>>,
}

impl SearchResponse {
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks.map(|page| page.items).unwrap_or_default()
    }
}
