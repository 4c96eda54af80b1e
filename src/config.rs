//! Application configuration loaded from environment variables and secret files.
//!
//! Deployments may mount secrets under `/run/secrets/<name>`; environment
//! variables always take precedence over mounted files.

use std::env;
use std::path::Path;

/// Application configuration, loaded once at startup and passed around
/// immutably. Request handlers never read the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Spotify OAuth client ID (public)
    pub spotify_client_id: String,
    /// Spotify OAuth client secret
    pub spotify_client_secret: String,
    /// Registered OAuth redirect URI
    pub redirect_uri: String,
    /// Frontend origin for CORS and post-login redirects
    pub frontend_url: String,
    /// MongoDB connection string for the playlist feed
    pub mongodb_uri: String,
    /// Completion API key for mood-to-color generation
    pub openai_api_key: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// `/run/secrets/<lowercased-name>` for each missing secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            spotify_client_id: lookup("CLIENT_ID").ok_or(ConfigError::Missing("CLIENT_ID"))?,
            spotify_client_secret: lookup("CLIENT_SECRET")
                .ok_or(ConfigError::Missing("CLIENT_SECRET"))?,
            redirect_uri: lookup("REDIRECT_URI")
                .unwrap_or_else(|| "https://api.statify.app/callback".to_string()),
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            mongodb_uri: lookup("MONGODB_URI")
                .unwrap_or_else(|| "mongodb://localhost:27017/statify".to_string()),
            openai_api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            port: lookup("PORT")
                .unwrap_or_else(|| "8888".to_string())
                .parse()
                .unwrap_or(8888),
        })
    }

    /// Fixed config for tests; no environment access.
    pub fn test_default() -> Self {
        Self {
            spotify_client_id: "test_client_id".to_string(),
            spotify_client_secret: "test_client_secret".to_string(),
            redirect_uri: "http://localhost:8888/callback".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            mongodb_uri: "mongodb://localhost:27017/statify-test".to_string(),
            openai_api_key: String::new(),
            port: 8888,
        }
    }
}

/// Environment variable first, then the matching secret file.
fn lookup(name: &str) -> Option<String> {
    if let Ok(value) = env::var(name) {
        let value = value.trim().to_string();
        if !value.is_empty() {
            return Some(value);
        }
    }
    read_secret_file(name)
}

fn read_secret_file(name: &str) -> Option<String> {
    let path = format!("/run/secrets/{}", name.to_lowercase());
    if !Path::new(&path).exists() {
        return None;
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => Some(contents.trim().to_string()),
        Err(err) => {
            tracing::warn!(path = %path, error = %err, "Failed to read secret file");
            None
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable or secret: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("CLIENT_ID", "test_id");
        env::set_var("CLIENT_SECRET", "test_secret");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.spotify_client_id, "test_id");
        assert_eq!(config.spotify_client_secret, "test_secret");
        assert_eq!(config.port, 8888);
        assert_eq!(config.frontend_url, "http://localhost:3000");
    }
}
