//! Domain types shared by the aggregator, profile builder and scorer

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calibration::CALIBRATION;

/// One of the three listening-history ranges top tracks are scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    /// Roughly the last four weeks
    Recent,
    /// Roughly the last six months
    Medium,
    /// Several years of history
    LongTerm,
}

impl TimeWindow {
    /// All windows in aggregation order
    pub const ALL: [TimeWindow; 3] = [Self::Recent, Self::Medium, Self::LongTerm];

    /// Fixed weight applied to every position score in this window
    pub const fn weight(self) -> u64 {
        CALIBRATION.window_weight(self)
    }

    /// Value of the `time_range` query parameter for this window
    pub const fn time_range(self) -> &'static str {
        match self {
            Self::Recent => "short_term",
            Self::Medium => "medium_term",
            Self::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.time_range())
    }
}

/// Numeric audio descriptors of a single track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    /// Decibels, roughly -60..0
    pub loudness: f64,
    pub speechiness: f64,
    /// Beats per minute
    pub tempo: f64,
    pub valence: f64,
    /// Pitch class 0-11 (-1 when no key was detected)
    pub key: i32,
    /// 1 = major, 0 = minor
    pub mode: i32,
    pub time_signature: i32,
}

impl AudioFeatures {
    /// Neutral record substituted when a track's features cannot be resolved
    pub const NEUTRAL: AudioFeatures = AudioFeatures {
        acousticness: 0.5,
        danceability: 0.5,
        energy: 0.5,
        instrumentalness: 0.5,
        liveness: 0.5,
        loudness: -10.0,
        speechiness: 0.5,
        tempo: 120.0,
        valence: 0.5,
        key: 5,
        mode: 1,
        time_signature: 4,
    };
}

/// Artist credited on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Genre tags, empty when the source did not provide any
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Artist {
    /// Artist with a name only
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            genres: Vec::new(),
        }
    }
}

/// A track as returned by the top-tracks source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Stable per-song identifier, the deduplication key
    pub id: String,
    pub name: String,
    pub artists: Vec<Artist>,
    /// Playable resource identifier
    pub uri: String,
    /// Features already known for this track, if any
    #[serde(default)]
    pub audio_features: Option<AudioFeatures>,
}

/// The three ranked lists aggregated for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowedTracks {
    pub recent: Vec<Track>,
    pub medium: Vec<Track>,
    pub long_term: Vec<Track>,
}

impl WindowedTracks {
    /// Ranked list for `window`
    pub fn window(&self, window: TimeWindow) -> &[Track] {
        match window {
            TimeWindow::Recent => &self.recent,
            TimeWindow::Medium => &self.medium,
            TimeWindow::LongTerm => &self.long_term,
        }
    }

    /// Mutable ranked list for `window`
    pub fn window_mut(&mut self, window: TimeWindow) -> &mut Vec<Track> {
        match window {
            TimeWindow::Recent => &mut self.recent,
            TimeWindow::Medium => &mut self.medium,
            TimeWindow::LongTerm => &mut self.long_term,
        }
    }

    pub fn is_empty(&self) -> bool {
        TimeWindow::ALL.iter().all(|w| self.window(*w).is_empty())
    }
}

/// Where a track appeared while aggregating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowAppearance {
    pub window: TimeWindow,
    /// 1-based rank within the window
    pub rank: usize,
}

/// A unique track with its accumulated ranking score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTrack {
    pub track: Track,
    pub score: u64,
    pub appearances: Vec<WindowAppearance>,
}

/// How a track's feature record was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureOrigin {
    /// Returned by the feature source during the build
    Fetched,
    /// Already attached to the track
    Provided,
    /// Lookup failed; [`AudioFeatures::NEUTRAL`] was substituted
    Fallback,
}

/// A track paired with the features used for its profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackWithFeatures {
    pub id: String,
    pub name: String,
    pub artists: Vec<Artist>,
    pub uri: String,
    pub audio_features: AudioFeatures,
    pub origin: FeatureOrigin,
}

/// A user's comparable listening signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibeProfile {
    pub user_id: String,
    pub display_name: String,
    pub tracks: Vec<TrackWithFeatures>,
    /// Mean of every track's features (the "vibe vector" before normalization)
    pub average_features: AudioFeatures,
    pub top_genres: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl VibeProfile {
    /// Number of tracks the profile was built from
    pub fn requested_count(&self) -> usize {
        self.tracks.len()
    }

    /// Tracks whose features came from real data
    pub fn resolved_count(&self) -> usize {
        self.tracks
            .iter()
            .filter(|t| t.origin != FeatureOrigin::Fallback)
            .count()
    }

    /// Tracks that fell back to neutral features
    pub fn fallback_count(&self) -> usize {
        self.requested_count() - self.resolved_count()
    }

    /// True when at least one track fell back to neutral features
    pub fn is_degraded(&self) -> bool {
        self.fallback_count() > 0
    }
}
