//! Derived artist records returned by the aggregation layer.
//!
//! These are recomputed per request (subject to the response cache) and
//! never persisted.

use serde::{Deserialize, Serialize};

/// Minimal track reference (name + playable URI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub name: String,
    pub uri: String,
}

/// A top artist enriched with follow status, top tracks, and album art.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedArtist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub followers: u64,
    /// Primary artist image.
    #[serde(rename = "albumImageUrl")]
    pub album_image_url: Option<String>,
    /// Cover of a randomly sampled album, falling back to the artist image.
    #[serde(rename = "randomImageUrl")]
    pub random_image_url: Option<String>,
    #[serde(rename = "isFollowed")]
    pub is_followed: bool,
    #[serde(rename = "topTracks")]
    pub top_tracks: Vec<TrackRef>,
    pub uri: Option<String>,
}

/// Artist images at the three catalog sizes plus latest album art.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistImages {
    pub header: Option<String>,
    pub profile: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(rename = "latestAlbumArt")]
    pub latest_album_art: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistTopTrack {
    pub name: String,
    pub duration_ms: u64,
    #[serde(rename = "albumImage")]
    pub album_image: Option<String>,
    #[serde(rename = "previewUrl")]
    pub preview_url: Option<String>,
    #[serde(rename = "spotifyUrl")]
    pub spotify_url: Option<String>,
}

/// Artist detail view: profile, sized images, top tracks.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistDetail {
    pub name: String,
    pub images: ArtistImages,
    pub genres: Vec<String>,
    #[serde(rename = "topTracks")]
    pub top_tracks: Vec<ArtistTopTrack>,
}

/// Recommendation output for the listening-history recommender.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedTrack {
    pub name: String,
    /// Comma-joined artist names.
    pub artists: String,
    pub image: Option<String>,
    pub url: Option<String>,
    pub uri: String,
}
