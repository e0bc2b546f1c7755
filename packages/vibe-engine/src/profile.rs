//! Vibe profile construction
//!
//! Resolves audio features for an aggregated ranking, averages them into the
//! profile's vibe vector and extracts the most frequent genres. Building a
//! profile never fails: any track whose features cannot be resolved gets
//! [`AudioFeatures::NEUTRAL`] and is marked [`FeatureOrigin::Fallback`].

use std::collections::HashMap;
use std::fmt::Display;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use crate::calibration::CALIBRATION;
use crate::models::{AggregatedTrack, AudioFeatures, FeatureOrigin, TrackWithFeatures, VibeProfile};

/// Default number of feature chunks requested at once
const DEFAULT_CONCURRENCY: usize = 2;

/// Source of per-track audio features
///
/// Implementations receive at most [`Calibration::feature_batch_size`] ids per
/// call and return one entry per id, in request order. `None` marks a track
/// the source has no features for.
///
/// [`Calibration::feature_batch_size`]: crate::Calibration::feature_batch_size
#[async_trait]
pub trait AudioFeatureSource: Send + Sync {
    type Error: Display + Send;

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, Self::Error>;
}

#[async_trait]
impl<S: AudioFeatureSource + ?Sized> AudioFeatureSource for &S {
    type Error = S::Error;

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, Self::Error> {
        (**self).audio_features(track_ids).await
    }
}

/// Builds [`VibeProfile`]s from aggregated tracks
#[derive(Debug, Clone)]
pub struct VibeProfileBuilder<S> {
    source: S,
    concurrency: usize,
}

impl<S: AudioFeatureSource> VibeProfileBuilder<S> {
    /// Create a builder fetching features from `source`
    pub fn new(source: S) -> Self {
        Self {
            source,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set how many feature chunks may be in flight at once (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Build a profile for one user
    #[instrument(skip(self, tracks), fields(track_count = tracks.len()))]
    pub async fn build(
        &self,
        user_id: &str,
        display_name: &str,
        tracks: &[AggregatedTrack],
    ) -> VibeProfile {
        let missing: Vec<String> = tracks
            .iter()
            .filter(|t| t.track.audio_features.is_none())
            .map(|t| t.track.id.clone())
            .collect();

        let mut fetched = self.fetch_features(&missing).await.into_iter();

        let tracks_with_features: Vec<TrackWithFeatures> = tracks
            .iter()
            .map(|aggregated| {
                let track = &aggregated.track;
                let (audio_features, origin) = match track.audio_features {
                    Some(features) => (features, FeatureOrigin::Provided),
                    None => match fetched.next().flatten() {
                        Some(features) => (features, FeatureOrigin::Fetched),
                        None => (AudioFeatures::NEUTRAL, FeatureOrigin::Fallback),
                    },
                };
                TrackWithFeatures {
                    id: track.id.clone(),
                    name: track.name.clone(),
                    artists: track.artists.clone(),
                    uri: track.uri.clone(),
                    audio_features,
                    origin,
                }
            })
            .collect();

        let features: Vec<AudioFeatures> = tracks_with_features
            .iter()
            .map(|t| t.audio_features)
            .collect();
        let average_features = average_features(&features);

        let genres = tracks
            .iter()
            .flat_map(|t| t.track.artists.iter())
            .flat_map(|a| a.genres.iter().map(String::as_str));
        let top_genres = top_genres(genres, CALIBRATION.top_genre_count());

        let profile = VibeProfile {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            tracks: tracks_with_features,
            average_features,
            top_genres,
            created_at: Utc::now(),
        };

        debug!(
            user_id,
            tracks = profile.requested_count(),
            resolved = profile.resolved_count(),
            top_genres = ?profile.top_genres,
            energy = profile.average_features.energy,
            valence = profile.average_features.valence,
            "Vibe profile created"
        );

        profile
    }

    /// Fetch features for `track_ids` in chunks, preserving input order
    ///
    /// A failed or malformed chunk yields `None` for each of its ids.
    async fn fetch_features(&self, track_ids: &[String]) -> Vec<Option<AudioFeatures>> {
        if track_ids.is_empty() {
            return Vec::new();
        }

        let chunks: Vec<&[String]> = track_ids
            .chunks(CALIBRATION.feature_batch_size())
            .collect();

        debug!(
            ids = track_ids.len(),
            chunks = chunks.len(),
            concurrency = self.concurrency,
            "Fetching audio features"
        );

        // `buffered` keeps chunk order so results line up with `track_ids`
        let results: Vec<Vec<Option<AudioFeatures>>> = stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| async move {
                match self.source.audio_features(chunk).await {
                    Ok(mut features) => {
                        if features.len() != chunk.len() {
                            warn!(
                                chunk = index,
                                requested = chunk.len(),
                                returned = features.len(),
                                "Feature source returned mismatched batch, padding with fallbacks"
                            );
                            features.resize(chunk.len(), None);
                        }
                        features
                    }
                    Err(e) => {
                        warn!(
                            chunk = index,
                            requested = chunk.len(),
                            error = %e,
                            "Audio feature fetch failed, using neutral features"
                        );
                        vec![None; chunk.len()]
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}

/// Arithmetic mean of a set of feature records
///
/// `key`, `mode` and `time_signature` are rounded to the nearest integer.
/// An empty set yields [`AudioFeatures::NEUTRAL`].
pub fn average_features(features: &[AudioFeatures]) -> AudioFeatures {
    if features.is_empty() {
        return AudioFeatures::NEUTRAL;
    }

    let count = features.len() as f64;
    let mean = |field: fn(&AudioFeatures) -> f64| features.iter().map(field).sum::<f64>() / count;
    let rounded_mean = |field: fn(&AudioFeatures) -> i32| {
        let sum: f64 = features.iter().map(|f| f64::from(field(f))).sum();
        (sum / count).round() as i32
    };

    AudioFeatures {
        acousticness: mean(|f| f.acousticness),
        danceability: mean(|f| f.danceability),
        energy: mean(|f| f.energy),
        instrumentalness: mean(|f| f.instrumentalness),
        liveness: mean(|f| f.liveness),
        loudness: mean(|f| f.loudness),
        speechiness: mean(|f| f.speechiness),
        tempo: mean(|f| f.tempo),
        valence: mean(|f| f.valence),
        key: rounded_mean(|f| f.key),
        mode: rounded_mean(|f| f.mode),
        time_signature: rounded_mean(|f| f.time_signature),
    }
}

/// Most frequent genres, ties broken by first occurrence
///
/// Tags are trimmed and lower-cased before counting; blank tags are ignored.
pub fn top_genres<'a, I>(genres: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index_by_genre: HashMap<String, usize> = HashMap::new();

    for genre in genres {
        let normalized = genre.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        match index_by_genre.get(&normalized) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                index_by_genre.insert(normalized.clone(), counts.len());
                counts.push((normalized, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(genre, _)| genre)
        .collect()
}
