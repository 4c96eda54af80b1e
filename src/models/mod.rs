// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod artist;
pub mod spotify;
pub mod user;

pub use artist::{ArtistDetail, EnrichedArtist, TrackRef};
pub use user::{NewPlaylist, Playlist, User};
