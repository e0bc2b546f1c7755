//! Shared test utilities for the Vibecheck workspace
//!
//! This crate provides a mock Spotify Web API and payload fixtures so the
//! client and worker test suites run without network access.
//!
//! # Mock Services
//!
//! - [`MockSpotifyServer`] - Mock Spotify Web API for client and job tests
//!
//! # Example
//!
//! ```rust,ignore
//! use vibecheck_test_utils::{AudioFeaturesFixture, MockSpotifyServer};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let spotify = MockSpotifyServer::start().await;
//!     spotify
//!         .mock_audio_features(vec![AudioFeaturesFixture::new("t1").energy(0.9)])
//!         .await;
//!
//!     // Use spotify.url() to configure your client
//! }
//! ```

mod fixtures;
mod spotify;

pub use fixtures::{ArtistFixture, AudioFeaturesFixture, TrackFixture};
pub use spotify::MockSpotifyServer;
