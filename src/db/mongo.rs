// SPDX-License-Identifier: MIT

//! MongoDB client wrapper with typed feed operations.
//!
//! The feed is a single collection of user documents with embedded playlist
//! arrays. All mutations are full-document read/replace; there are no
//! transactions, so concurrent writers to the same user can interleave
//! (accepted best-effort semantics).

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Playlist, User};
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};

/// MongoDB database client.
#[derive(Clone)]
pub struct MongoDb {
    db: Option<mongodb::Database>,
}

impl MongoDb {
    /// Connect using a MongoDB URI. The database name comes from the URI
    /// path, defaulting to `statify`.
    pub async fn connect(uri: &str) -> Result<Self, AppError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        let db = client
            .default_database()
            .unwrap_or_else(|| client.database("statify"));

        tracing::info!(database = %db.name(), "Connected to MongoDB");

        Ok(Self { db: Some(db) })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { db: None }
    }

    fn users(&self) -> Result<Collection<User>, AppError> {
        self.db
            .as_ref()
            .map(|db| db.collection::<User>(collections::USERS))
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Feed Operations ─────────────────────────────────────────

    /// Get a feed document by Spotify user id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.users()?
            .find_one(doc! { "userID": user_id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find-or-create the user document, overwrite `displayName`, and append
    /// the incoming playlists.
    ///
    /// Appends do not de-duplicate by `playlistID`; repeated submissions
    /// produce duplicate entries. Returns the user's total playlist count.
    pub async fn upsert_playlists(
        &self,
        user_id: &str,
        display_name: &str,
        playlists: Vec<Playlist>,
    ) -> Result<usize, AppError> {
        let mut user = self.get_user(user_id).await?.unwrap_or_else(|| User {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            playlists: Vec::new(),
        });

        user.display_name = display_name.to_string();
        user.playlists.extend(playlists);
        let total = user.playlists.len();

        self.users()?
            .replace_one(doc! { "userID": user_id }, &user)
            .upsert(true)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total)
    }

    /// Return every feed document, unfiltered and unpaged.
    pub async fn list_feed(&self) -> Result<Vec<User>, AppError> {
        let cursor = self
            .users()?
            .find(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove one playlist from a user's feed document.
    ///
    /// Distinct not-found errors for a missing user vs a missing playlist.
    /// Ownership must be verified by the caller before calling this.
    pub async fn delete_playlist(&self, user_id: &str, playlist_id: &str) -> Result<(), AppError> {
        let mut user = self
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let index = user
            .playlists
            .iter()
            .position(|p| p.playlist_id == playlist_id)
            .ok_or_else(|| AppError::NotFound(format!("Playlist {} not found", playlist_id)))?;

        user.playlists.remove(index);

        self.users()?
            .replace_one(doc! { "userID": user_id }, &user)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Delete a feed document entirely (test cleanup).
    pub async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        self.users()?
            .delete_one(doc! { "userID": user_id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
