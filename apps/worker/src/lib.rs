//! Vibecheck worker
//!
//! Runs the playlist-generation cycle for a user: fetch the three top-track
//! windows, aggregate them, sync the ultimate playlist, build the vibe profile
//! and optionally score it against a second user.

pub mod config;
pub mod error;
pub mod jobs;

use vibecheck_shared_config::SpotifyConfig;
use vibecheck_spotify_client::SpotifyClient;

use crate::error::WorkerResult;

/// Shared state handed to every job
#[derive(Debug, Clone)]
pub struct AppState {
    /// Spotify Web API client (holds no user credentials)
    pub spotify: SpotifyClient,
}

impl AppState {
    /// Build state from Spotify configuration
    pub fn new(config: &SpotifyConfig) -> WorkerResult<Self> {
        config.validate()?;
        Ok(Self::from_client(SpotifyClient::new(config)?))
    }

    /// Wrap an already configured client
    pub fn from_client(spotify: SpotifyClient) -> Self {
        Self { spotify }
    }

    /// Spotify configuration the client was built with
    pub fn spotify_config(&self) -> &SpotifyConfig {
        self.spotify.config()
    }
}
