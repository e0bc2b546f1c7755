//! Track aggregation and vibe compatibility engine for Vibecheck
//!
//! This crate turns a listener's top tracks into something comparable:
//! - [`aggregate`] merges the three listening-history windows into one
//!   weighted, deduplicated ranking (the "ultimate" playlist order)
//! - [`VibeProfileBuilder`] resolves audio features for that ranking and
//!   reduces them to a mean "vibe vector" plus top genres
//! - [`compatibility_score`] blends vector similarity, genre overlap and
//!   shared tracks into a 0-100 score between two profiles
//!
//! Every weight involved lives in [`CALIBRATION`] and cannot be overridden.
//!
//! # Example
//!
//! ```rust,no_run
//! use vibecheck_engine::{aggregate, compatibility_score, VibeProfileBuilder, WindowedTracks};
//! # use vibecheck_engine::{AudioFeatureSource, AudioFeatures};
//! # struct Source;
//! # #[async_trait::async_trait]
//! # impl AudioFeatureSource for Source {
//! #     type Error = std::convert::Infallible;
//! #     async fn audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>, Self::Error> {
//! #         Ok(vec![None; ids.len()])
//! #     }
//! # }
//!
//! # async fn example(windows: WindowedTracks, peer: vibecheck_engine::VibeProfile) {
//! let ranked = aggregate(&windows);
//! let profile = VibeProfileBuilder::new(Source)
//!     .build("user-1", "Listener", &ranked)
//!     .await;
//!
//! println!("compatibility: {}", compatibility_score(&profile, &peer));
//! # }
//! ```

mod aggregate;
mod calibration;
mod compatibility;
mod models;
mod normalize;
mod profile;

pub use aggregate::{aggregate, playlist_uris};
pub use calibration::{Calibration, CALIBRATION};
pub use compatibility::{
    compatibility_breakdown, compatibility_score, cosine_similarity, find_compatible_users,
    genre_similarity, track_overlap, CompatibilityBreakdown, CompatibleUser,
};
pub use models::{
    AggregatedTrack, Artist, AudioFeatures, FeatureOrigin, TimeWindow, Track, TrackWithFeatures,
    VibeProfile, WindowAppearance, WindowedTracks,
};
pub use normalize::{feature_vector, FeatureVector, FEATURE_DIMENSIONS};
pub use profile::{average_features, top_genres, AudioFeatureSource, VibeProfileBuilder};
