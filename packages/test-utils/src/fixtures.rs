//! JSON fixtures shaped like Spotify Web API payloads

use serde_json::json;
use vibecheck_engine::AudioFeatures;

/// Artist credited on a [`TrackFixture`]
#[derive(Debug, Clone)]
pub struct ArtistFixture {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
}

impl ArtistFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            genres: Vec::new(),
        }
    }

    /// Convert to a Spotify artist object
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "name": self.name,
            "type": "artist",
            "uri": format!("spotify:artist:{}", self.id),
            "genres": self.genres
        })
    }
}

/// Track entry of a top-tracks page
#[derive(Debug, Clone)]
pub struct TrackFixture {
    /// `None` renders a local file (null id)
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    pub artists: Vec<ArtistFixture>,
}

impl TrackFixture {
    /// Catalog track `id` by a single artist `artist-{id}`
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: format!("Track {}", id),
            uri: format!("spotify:track:{}", id),
            artists: vec![ArtistFixture::new(
                &format!("artist-{}", id),
                &format!("Artist {}", id),
            )],
        }
    }

    /// Local file: no id, local URI
    pub fn local_file(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            uri: format!("spotify:local:::{}:180", name.replace(' ', "+")),
            artists: vec![ArtistFixture::new("", "Unknown Artist")],
        }
    }

    /// Set the genres of the first artist
    pub fn with_genres(mut self, genres: &[&str]) -> Self {
        if let Some(artist) = self.artists.first_mut() {
            artist.genres = genres.iter().map(|g| g.to_string()).collect();
        }
        self
    }

    /// Replace the credited artists
    pub fn with_artist(mut self, artist: ArtistFixture) -> Self {
        self.artists = vec![artist];
        self
    }

    /// Convert to a Spotify track object
    pub fn to_json(&self) -> serde_json::Value {
        let artists: Vec<serde_json::Value> = self
            .artists
            .iter()
            .map(|a| {
                // Track payloads carry simplified artists unless genres were set
                let mut value = a.to_json();
                if a.genres.is_empty() {
                    if let Some(obj) = value.as_object_mut() {
                        obj.remove("genres");
                    }
                }
                if a.id.is_empty() {
                    value["id"] = serde_json::Value::Null;
                }
                value
            })
            .collect();

        json!({
            "id": self.id,
            "name": self.name,
            "uri": self.uri,
            "type": "track",
            "is_local": self.id.is_none(),
            "popularity": 50,
            "artists": artists
        })
    }
}

/// Entry of an audio-features response
#[derive(Debug, Clone)]
pub struct AudioFeaturesFixture {
    pub id: String,
    pub features: AudioFeatures,
}

impl AudioFeaturesFixture {
    /// Neutral features for track `id`
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            features: AudioFeatures::NEUTRAL,
        }
    }

    /// Use explicit features
    pub fn with_features(id: &str, features: AudioFeatures) -> Self {
        Self {
            id: id.to_string(),
            features,
        }
    }

    pub fn energy(mut self, energy: f64) -> Self {
        self.features.energy = energy;
        self
    }

    pub fn valence(mut self, valence: f64) -> Self {
        self.features.valence = valence;
        self
    }

    pub fn tempo(mut self, tempo: f64) -> Self {
        self.features.tempo = tempo;
        self
    }

    /// Convert to a Spotify audio-features object
    pub fn to_json(&self) -> serde_json::Value {
        let f = &self.features;
        json!({
            "id": self.id,
            "type": "audio_features",
            "uri": format!("spotify:track:{}", self.id),
            "duration_ms": 215_000,
            "acousticness": f.acousticness,
            "danceability": f.danceability,
            "energy": f.energy,
            "instrumentalness": f.instrumentalness,
            "liveness": f.liveness,
            "loudness": f.loudness,
            "speechiness": f.speechiness,
            "tempo": f.tempo,
            "valence": f.valence,
            "key": f.key,
            "mode": f.mode,
            "time_signature": f.time_signature
        })
    }
}
