//! Compatibility scoring between two vibe profiles
//!
//! The score blends three similarities using the fixed calibration weights:
//! - Vibe-vector cosine similarity (sonic signature)
//! - Genre Jaccard similarity
//! - Shared-track ratio

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::CALIBRATION;
use crate::models::{TrackWithFeatures, VibeProfile};
use crate::normalize::{feature_vector, FeatureVector};

/// Per-component similarities behind a compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityBreakdown {
    /// Cosine similarity of the normalized vibe vectors
    pub audio: f64,
    /// Jaccard similarity of the top genres
    pub genre: f64,
    /// Shared tracks over the longer track list
    pub tracks: f64,
    /// Weighted blend, 0-100
    pub score: u8,
}

/// A candidate whose score cleared the compatibility threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibleUser<'a> {
    pub user: &'a VibeProfile,
    pub compatibility_score: u8,
}

/// Cosine similarity of two normalized vectors
///
/// Returns 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Case-insensitive Jaccard similarity of two genre lists
///
/// Two empty lists are identical (1); exactly one empty list shares nothing (0).
pub fn genre_similarity<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let set_a: HashSet<String> = a.iter().map(|g| g.as_ref().to_lowercase()).collect();
    let set_b: HashSet<String> = b.iter().map(|g| g.as_ref().to_lowercase()).collect();

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}

/// Shared track URIs divided by the longer of the two track lists
///
/// Returns 0 when both lists are empty.
pub fn track_overlap(a: &[TrackWithFeatures], b: &[TrackWithFeatures]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }

    let uris_a: HashSet<&str> = a.iter().map(|t| t.uri.as_str()).collect();
    let uris_b: HashSet<&str> = b.iter().map(|t| t.uri.as_str()).collect();
    let shared = uris_a.intersection(&uris_b).count();

    shared as f64 / longest as f64
}

/// Component similarities and final score for two profiles
pub fn compatibility_breakdown(a: &VibeProfile, b: &VibeProfile) -> CompatibilityBreakdown {
    let audio = cosine_similarity(
        &feature_vector(&a.average_features),
        &feature_vector(&b.average_features),
    );
    let genre = genre_similarity(&a.top_genres, &b.top_genres);
    let tracks = track_overlap(&a.tracks, &b.tracks);

    let blended = audio * CALIBRATION.audio_weight()
        + genre * CALIBRATION.genre_weight()
        + tracks * CALIBRATION.track_weight();
    let score = (blended * 100.0).round().clamp(0.0, 100.0) as u8;

    debug!(
        a = %a.display_name,
        b = %b.display_name,
        audio,
        genre,
        tracks,
        score,
        "Calculated compatibility"
    );

    CompatibilityBreakdown {
        audio,
        genre,
        tracks,
        score,
    }
}

/// Compatibility score (0-100) between two profiles
///
/// Symmetric: `compatibility_score(a, b) == compatibility_score(b, a)`.
pub fn compatibility_score(a: &VibeProfile, b: &VibeProfile) -> u8 {
    compatibility_breakdown(a, b).score
}

/// Candidates compatible with `profile`, best match first
///
/// Skips candidates sharing the profile's user id and keeps only scores at or
/// above [`Calibration::compatible_threshold`](crate::Calibration::compatible_threshold).
pub fn find_compatible_users<'a>(
    profile: &VibeProfile,
    candidates: &'a [VibeProfile],
) -> Vec<CompatibleUser<'a>> {
    let mut matches: Vec<CompatibleUser<'a>> = candidates
        .iter()
        .filter(|candidate| candidate.user_id != profile.user_id)
        .map(|candidate| CompatibleUser {
            user: candidate,
            compatibility_score: compatibility_score(profile, candidate),
        })
        .filter(|m| m.compatibility_score >= CALIBRATION.compatible_threshold())
        .collect();

    matches.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
    matches
}
