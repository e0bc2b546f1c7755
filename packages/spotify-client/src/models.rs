//! Spotify Web API request and response models

use serde::{Deserialize, Serialize};
use vibecheck_engine::{Artist, AudioFeatures, Track};

/// The user owning the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CurrentUser {
    /// Display name, falling back to the user id
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}

/// A playlist created or updated through the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

/// Settings for a new playlist
#[derive(Debug, Clone, Serialize)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub public: bool,
}

// Internal response types for deserialization

#[derive(Debug, Deserialize)]
pub(crate) struct TopTracksResponse {
    pub items: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTrack {
    /// Null for local files
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl RawTrack {
    /// Convert to a domain track, dropping tracks without an id
    pub(crate) fn into_track(self) -> Option<Track> {
        let id = self.id.filter(|id| !id.is_empty())?;
        Some(Track {
            id,
            name: self.name,
            artists: self.artists.into_iter().map(Into::into).collect(),
            uri: self.uri,
            audio_features: None,
        })
    }
}

impl From<RawArtist> for Artist {
    fn from(raw: RawArtist) -> Self {
        Self {
            id: raw.id.filter(|s| !s.is_empty()),
            name: raw.name,
            genres: raw.genres,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistsResponse {
    pub artists: Vec<Option<RawArtist>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TrackUrisRequest<'a> {
    pub uris: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotResponse {
    pub snapshot_id: String,
}

/// Spotify API error response
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[allow(dead_code)] // Required for serde deserialization, status comes from HTTP
    pub status: Option<u16>,
    pub message: String,
}
