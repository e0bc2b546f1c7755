//! Fixed calibration constants
//!
//! Rankings and compatibility scores must be reproducible across runs, so the
//! weights are compile-time constants. The fields are private and the only
//! instance is [`CALIBRATION`]: callers can read them, never replace them.

use crate::models::TimeWindow;

/// Every weight and limit the engine applies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    recent_weight: u64,
    medium_weight: u64,
    long_term_weight: u64,
    audio_weight: f64,
    genre_weight: f64,
    track_weight: f64,
    top_genre_count: usize,
    feature_batch_size: usize,
    playlist_uri_limit: usize,
    compatible_threshold: u8,
}

/// The calibration used by the aggregator, builder and scorer
pub const CALIBRATION: Calibration = Calibration {
    recent_weight: 100,
    medium_weight: 50,
    long_term_weight: 25,
    audio_weight: 0.7,
    genre_weight: 0.2,
    track_weight: 0.1,
    top_genre_count: 5,
    feature_batch_size: 100,
    playlist_uri_limit: 100,
    compatible_threshold: 70,
};

impl Calibration {
    /// Weight multiplied into every position score of `window`
    pub const fn window_weight(&self, window: TimeWindow) -> u64 {
        match window {
            TimeWindow::Recent => self.recent_weight,
            TimeWindow::Medium => self.medium_weight,
            TimeWindow::LongTerm => self.long_term_weight,
        }
    }

    /// Share of the compatibility score taken by vibe-vector cosine similarity
    pub const fn audio_weight(&self) -> f64 {
        self.audio_weight
    }

    /// Share of the compatibility score taken by genre Jaccard similarity
    pub const fn genre_weight(&self) -> f64 {
        self.genre_weight
    }

    /// Share of the compatibility score taken by shared tracks
    pub const fn track_weight(&self) -> f64 {
        self.track_weight
    }

    /// Number of genres kept in a profile
    pub const fn top_genre_count(&self) -> usize {
        self.top_genre_count
    }

    /// Maximum track ids per audio-feature request
    pub const fn feature_batch_size(&self) -> usize {
        self.feature_batch_size
    }

    /// Maximum URIs pushed to a playlist in one request
    pub const fn playlist_uri_limit(&self) -> usize {
        self.playlist_uri_limit
    }

    /// Minimum score for a user to be listed as compatible
    pub const fn compatible_threshold(&self) -> u8 {
        self.compatible_threshold
    }
}
