//! Worker configuration loaded from environment variables
//!
//! Besides the shared Spotify settings, the worker needs the access token of
//! the user it runs for. Tokens are obtained by the login flow and handed over
//! through the environment; the worker never refreshes them.

use std::env;

use anyhow::{Context, Result};
use vibecheck_shared_config::{get_required_env, CommonConfig, Environment, SpotifyConfig};
use vibecheck_spotify_client::SpotifySession;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Session of the user the cycle runs for
    pub session: SpotifySession,

    /// Optional second user to score compatibility against
    pub peer_session: Option<SpotifySession>,

    /// Ultimate playlist created by an earlier cycle, if any
    pub playlist_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        let access_token =
            get_required_env("VIBECHECK_ACCESS_TOKEN").context("VIBECHECK_ACCESS_TOKEN is required")?;

        Ok(Self {
            common,
            session: SpotifySession::new(access_token),
            peer_session: optional_env("VIBECHECK_PEER_ACCESS_TOKEN").map(SpotifySession::new),
            playlist_id: optional_env("VIBECHECK_PLAYLIST_ID"),
        })
    }

    /// Get Spotify configuration
    pub fn spotify(&self) -> &SpotifyConfig {
        &self.common.spotify
    }

    /// Get environment mode
    pub fn environment(&self) -> Environment {
        self.common.environment
    }

    /// Tracing filter directive
    pub fn log_level(&self) -> &str {
        &self.common.log_level
    }
}

/// Read a variable, treating blank values as unset
fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
