//! Audio feature normalization
//!
//! Maps an [`AudioFeatures`] record onto a fixed-length vector whose
//! dimensions share roughly the same 0..1 range, so no single descriptor
//! (tempo in BPM, loudness in dB) dominates cosine similarity.

use crate::models::AudioFeatures;

/// Number of dimensions in a normalized feature vector
pub const FEATURE_DIMENSIONS: usize = 12;

/// Normalized feature vector
pub type FeatureVector = [f64; FEATURE_DIMENSIONS];

/// Loudness floor in dB mapped to 0
const LOUDNESS_RANGE_DB: f64 = 60.0;

/// Tempo mapped to 1
const TEMPO_SCALE_BPM: f64 = 200.0;

/// Highest pitch class
const KEY_SCALE: f64 = 11.0;

/// Highest common time signature
const TIME_SIGNATURE_SCALE: f64 = 7.0;

/// Convert features into a normalized vector
///
/// Unit-range descriptors and `mode` pass through unchanged; loudness, tempo,
/// key and time signature are rescaled.
pub fn feature_vector(features: &AudioFeatures) -> FeatureVector {
    [
        features.acousticness,
        features.danceability,
        features.energy,
        features.instrumentalness,
        features.liveness,
        features.loudness / LOUDNESS_RANGE_DB + 1.0,
        features.speechiness,
        features.tempo / TEMPO_SCALE_BPM,
        features.valence,
        f64::from(features.key) / KEY_SCALE,
        f64::from(features.mode),
        f64::from(features.time_signature) / TIME_SIGNATURE_SCALE,
    ]
}
