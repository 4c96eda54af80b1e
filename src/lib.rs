// SPDX-License-Identifier: MIT

//! Statify backend: a Spotify listening-stats API.
//!
//! Proxies the Spotify Web API behind cookie-based OAuth sessions, enriches
//! top-artist data with batched follow/track/album lookups, persists shared
//! playlists to MongoDB, and renders three-color gradient cover art.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use cache::ResponseCache;
use config::Config;
use db::MongoDb;
use services::{AggregationService, GradientStore, MoodColorClient, SpotifyClient};

/// Shared application state, cloned per request by the router.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: MongoDb,
    pub spotify: SpotifyClient,
    pub aggregator: AggregationService,
    pub mood_colors: MoodColorClient,
    pub gradients: GradientStore,
    pub cache: ResponseCache,
}

impl AppState {
    pub fn new(config: Config, db: MongoDb) -> Self {
        let spotify = SpotifyClient::new(
            config.spotify_client_id.clone(),
            config.spotify_client_secret.clone(),
        );
        let cache = ResponseCache::new(1024);
        let aggregator = AggregationService::new(spotify.clone(), cache.clone());
        let mood_colors = MoodColorClient::new(config.openai_api_key.clone());

        Self {
            config,
            db,
            spotify,
            aggregator,
            mood_colors,
            gradients: GradientStore::new(256),
            cache,
        }
    }
}
