//! Spotify Web API client for Vibecheck
//!
//! This crate provides the calls the playlist-generation cycle needs:
//! - Top tracks per listening-history window
//! - Audio features (in batches of up to 100)
//! - Artist genres
//! - Playlist creation and track updates
//!
//! Credentials are never read from ambient state: each call takes an explicit
//! [`SpotifySession`]. Obtaining and refreshing tokens is left to the
//! authorization flow.
//!
//! # Example
//!
//! ```rust,no_run
//! use vibecheck_engine::TimeWindow;
//! use vibecheck_shared_config::SpotifyConfig;
//! use vibecheck_spotify_client::{SpotifyClient, SpotifySession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SpotifyClient::new(&SpotifyConfig::default())?;
//! let session = SpotifySession::new("access-token");
//!
//! let tracks = client.get_top_tracks(&session, TimeWindow::Recent, Some(50)).await?;
//! for track in tracks {
//!     println!("{} ({})", track.name, track.uri);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;
mod session;
mod source;

pub use client::{SpotifyClient, MAX_ARTIST_IDS, MAX_AUDIO_FEATURE_IDS, MAX_PLAYLIST_URIS};
pub use error::{SpotifyError, SpotifyResult};
pub use models::{CurrentUser, NewPlaylist, Playlist};
pub use session::SpotifySession;
pub use source::SessionFeatureSource;
