//! Jobs making up the playlist-generation cycle
//!
//! - [`ultimate_playlist`] - fetch the three windows, aggregate, sync the playlist
//! - [`vibe_profile`] - enrich artist genres and build the vibe profile
//! - [`cycle`] - both of the above for one user, plus optional peer scoring

pub mod cycle;
pub mod ultimate_playlist;
pub mod vibe_profile;
