//! Feed document models.
//!
//! One document per Spotify user; playlists are embedded. `userID` is the
//! Spotify login id and `displayName` the profile name shown in the feed.

use serde::{Deserialize, Serialize};

/// Feed document stored in MongoDB, keyed by Spotify user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userID")]
    pub user_id: String,
    /// Overwritten on every feed write.
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

/// Playlist summary embedded in a feed document.
///
/// `playlistID` (the Spotify playlist id) is unique within one user's array
/// but not globally. Records are append-only: never updated in place, only
/// appended or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "playlistID")]
    pub playlist_id: String,
    pub name: String,
    #[serde(rename = "trackURIs", default)]
    pub track_uris: Vec<String>,
    /// RFC 3339 creation timestamp, set server-side.
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "imageBase64", skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    /// Owning user id, denormalized onto each entry.
    #[serde(rename = "userID")]
    pub user_id: String,
}

/// Incoming playlist from a feed submission (server fills the rest).
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlaylist {
    #[serde(rename = "playlistID")]
    pub playlist_id: String,
    pub name: String,
    #[serde(rename = "trackURIs", default)]
    pub track_uris: Vec<String>,
    #[serde(rename = "imageBase64")]
    pub image_base64: Option<String>,
}
