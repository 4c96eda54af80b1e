// SPDX-License-Identifier: MIT

//! Shared helpers for integration tests.

// Not every test binary uses every helper
#![allow(dead_code)]

use axum::Router;
use statify::config::Config;
use statify::db::MongoDb;
use statify::{routes, AppState};

/// App wired against test config and a disconnected database. Endpoints
/// that call Spotify or Mongo will error; routing, validation, auth, and
/// gradient behavior are all exercisable offline.
pub fn create_test_app() -> Router {
    let state = AppState::new(Config::test_default(), MongoDb::new_mock());
    routes::create_router(state)
}

/// MongoDB connection string for integration tests, when one is provided.
pub fn mongo_uri() -> Option<String> {
    std::env::var("MONGODB_TEST_URI")
        .ok()
        .filter(|uri| !uri.is_empty())
}

/// Skip the test unless a MongoDB instance is reachable.
#[macro_export]
macro_rules! require_mongo {
    () => {
        match common::mongo_uri() {
            Some(uri) => uri,
            None => {
                eprintln!("Skipping: set MONGODB_TEST_URI to run MongoDB integration tests");
                return;
            }
        }
    };
}
