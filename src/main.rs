// SPDX-License-Identifier: MIT

use statify::config::Config;
use statify::db::MongoDb;
use statify::{routes, AppState};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("statify=debug,tower_http=info"));

    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env()?;
    let port = config.port;

    // The API can serve Spotify-backed routes without a database; the feed
    // endpoints report an error until Mongo comes back.
    let db = match MongoDb::connect(&config.mongodb_uri).await {
        Ok(db) => db,
        Err(err) => {
            tracing::warn!(error = %err, "MongoDB unavailable, feed endpoints disabled");
            MongoDb::new_mock()
        }
    };

    let state = AppState::new(config, db);
    let app = routes::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Statify API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
