// SPDX-License-Identifier: MIT

//! Feed store tests against a real MongoDB instance.
//!
//! Skipped unless MONGODB_TEST_URI points at a reachable server, e.g.
//! `MONGODB_TEST_URI=mongodb://localhost:27017/statify-test cargo test`.

mod common;

use statify::db::MongoDb;
use statify::error::AppError;
use statify::models::Playlist;

fn playlist(id: &str, user_id: &str) -> Playlist {
    Playlist {
        playlist_id: id.to_string(),
        name: format!("playlist-{}", id),
        track_uris: vec!["spotify:track:t1".to_string()],
        created_at: chrono::Utc::now().to_rfc3339(),
        image_base64: None,
        user_id: user_id.to_string(),
    }
}

#[tokio::test]
async fn test_publish_and_list_feed() {
    let uri = require_mongo!();
    let db = MongoDb::connect(&uri).await.unwrap();
    let user_id = format!("it-user-{}", std::process::id());
    db.delete_user(&user_id).await.unwrap();

    let added = db
        .upsert_playlists(&user_id, "Alice", vec![playlist("p1", &user_id)])
        .await
        .unwrap();
    assert_eq!(added, 1);

    let feed = db.list_feed().await.unwrap();
    let entry = feed.iter().find(|u| u.user_id == user_id).unwrap();
    assert_eq!(entry.display_name, "Alice");
    assert_eq!(entry.playlists.len(), 1);
    assert_eq!(entry.playlists[0].playlist_id, "p1");

    db.delete_user(&user_id).await.unwrap();
}

#[tokio::test]
async fn test_publish_appends_and_updates_display_name() {
    let uri = require_mongo!();
    let db = MongoDb::connect(&uri).await.unwrap();
    let user_id = format!("it-append-{}", std::process::id());
    db.delete_user(&user_id).await.unwrap();

    db.upsert_playlists(&user_id, "Alice", vec![playlist("p1", &user_id)])
        .await
        .unwrap();
    db.upsert_playlists(&user_id, "Alice Renamed", vec![playlist("p2", &user_id)])
        .await
        .unwrap();

    let user = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.display_name, "Alice Renamed");
    assert_eq!(user.playlists.len(), 2);

    db.delete_user(&user_id).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_publish_appends_again() {
    // Same playlist published twice shows up twice; the feed does not dedupe
    let uri = require_mongo!();
    let db = MongoDb::connect(&uri).await.unwrap();
    let user_id = format!("it-dup-{}", std::process::id());
    db.delete_user(&user_id).await.unwrap();

    db.upsert_playlists(&user_id, "Bob", vec![playlist("p1", &user_id)])
        .await
        .unwrap();
    db.upsert_playlists(&user_id, "Bob", vec![playlist("p1", &user_id)])
        .await
        .unwrap();

    let user = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.playlists.len(), 2);

    db.delete_user(&user_id).await.unwrap();
}

#[tokio::test]
async fn test_delete_removes_only_target_playlist() {
    let uri = require_mongo!();
    let db = MongoDb::connect(&uri).await.unwrap();
    let user_id = format!("it-delete-{}", std::process::id());
    db.delete_user(&user_id).await.unwrap();

    db.upsert_playlists(
        &user_id,
        "Carol",
        vec![playlist("p1", &user_id), playlist("p2", &user_id)],
    )
    .await
    .unwrap();

    db.delete_playlist(&user_id, "p1").await.unwrap();

    let user = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.playlists.len(), 1);
    assert_eq!(user.playlists[0].playlist_id, "p2");

    db.delete_user(&user_id).await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_playlist_is_not_found() {
    let uri = require_mongo!();
    let db = MongoDb::connect(&uri).await.unwrap();
    let user_id = format!("it-missing-{}", std::process::id());
    db.delete_user(&user_id).await.unwrap();

    db.upsert_playlists(&user_id, "Dave", vec![playlist("p1", &user_id)])
        .await
        .unwrap();

    let err = db.delete_playlist(&user_id, "nope").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = db.delete_playlist("no-such-user", "p1").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    db.delete_user(&user_id).await.unwrap();
}
