//! Spotify Web API configuration types

use crate::{get_env_or_default, parse_env, ConfigError, ConfigResult};

/// Default Spotify Web API base URL
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Largest page the top-tracks endpoint serves
pub const MAX_TOP_TRACKS_LIMIT: u32 = 50;

/// Smallest per-window page worth aggregating
pub const MIN_TOP_TRACKS_LIMIT: u32 = 20;

/// Upper bound on retry attempts
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Spotify Web API configuration
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// API base URL (overridable for testing)
    pub api_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Tracks requested per listening-history window
    pub top_tracks_limit: u32,

    /// Retry attempts for transient failures
    pub max_retries: u32,

    /// Audio-feature chunks requested at once
    pub feature_concurrency: usize,

    /// Look up artist genres before building vibe profiles
    pub fetch_artist_genres: bool,
}

impl SpotifyConfig {
    /// Load Spotify configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            api_url: get_env_or_default("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL),
            timeout_secs: parse_env("SPOTIFY_TIMEOUT", 10)?,
            top_tracks_limit: parse_env("SPOTIFY_TOP_TRACKS_LIMIT", MAX_TOP_TRACKS_LIMIT)?,
            max_retries: parse_env("SPOTIFY_MAX_RETRIES", 3)?,
            feature_concurrency: parse_env("SPOTIFY_FEATURE_CONCURRENCY", 2)?,
            fetch_artist_genres: parse_env("SPOTIFY_FETCH_ARTIST_GENRES", true)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration with a custom API URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            api_url: url.into(),
            ..Self::default()
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "SPOTIFY_API_URL".to_string(),
                "URL cannot be empty".to_string(),
            ));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(
                "SPOTIFY_API_URL".to_string(),
                self.api_url.clone(),
            ));
        }
        if !(MIN_TOP_TRACKS_LIMIT..=MAX_TOP_TRACKS_LIMIT).contains(&self.top_tracks_limit) {
            return Err(ConfigError::InvalidValue(
                "SPOTIFY_TOP_TRACKS_LIMIT".to_string(),
                format!(
                    "must be between {} and {}",
                    MIN_TOP_TRACKS_LIMIT, MAX_TOP_TRACKS_LIMIT
                ),
            ));
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::InvalidValue(
                "SPOTIFY_MAX_RETRIES".to_string(),
                format!("must be at most {}", MAX_RETRIES_LIMIT),
            ));
        }
        if self.feature_concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "SPOTIFY_FEATURE_CONCURRENCY".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the full URL for an API endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_SPOTIFY_API_URL.to_string(),
            timeout_secs: 10,
            top_tracks_limit: MAX_TOP_TRACKS_LIMIT,
            max_retries: 3,
            feature_concurrency: 2,
            fetch_artist_genres: true,
        }
    }
}
