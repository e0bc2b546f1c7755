//! Playlist-generation cycle
//!
//! One cycle runs the ultimate playlist job and then the vibe profile job for
//! the session's user. With a peer session, the peer's profile is built the
//! same way (without touching their playlists) and both are scored.
//!
//! Only a failure to identify the user aborts the cycle. A failed playlist
//! write or peer lookup is logged and left out of the summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use vibecheck_engine::{
    aggregate, compatibility_breakdown, AudioFeatures, CompatibilityBreakdown, VibeProfile,
    CALIBRATION,
};
use vibecheck_spotify_client::SpotifySession;

use crate::error::WorkerResult;
use crate::jobs::ultimate_playlist::{self, PlaylistSync, UltimatePlaylistJob};
use crate::jobs::vibe_profile;
use crate::AppState;

/// Input of one cycle
#[derive(Debug, Clone)]
pub struct CycleRequest {
    /// Session of the user the cycle runs for
    pub session: SpotifySession,
    /// Second user to score against
    pub peer_session: Option<SpotifySession>,
    /// Ultimate playlist created by an earlier cycle
    pub playlist_id: Option<String>,
}

/// Condensed view of a vibe profile
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub user_id: String,
    pub display_name: String,
    pub requested_tracks: usize,
    pub resolved_tracks: usize,
    pub fallback_tracks: usize,
    pub average_features: AudioFeatures,
    pub top_genres: Vec<String>,
}

impl From<&VibeProfile> for ProfileSummary {
    fn from(profile: &VibeProfile) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            display_name: profile.display_name.clone(),
            requested_tracks: profile.requested_count(),
            resolved_tracks: profile.resolved_count(),
            fallback_tracks: profile.fallback_count(),
            average_features: profile.average_features,
            top_genres: profile.top_genres.clone(),
        }
    }
}

/// Score of the user against the peer
#[derive(Debug, Clone, Serialize)]
pub struct PeerCompatibility {
    pub peer: ProfileSummary,
    pub breakdown: CompatibilityBreakdown,
    /// Score reached the compatible-match threshold
    pub compatible: bool,
}

/// Everything one cycle produced
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub profile: ProfileSummary,
    pub unique_tracks: usize,
    pub playlist: Option<PlaylistSync>,
    pub compatibility: Option<PeerCompatibility>,
    pub generated_at: DateTime<Utc>,
}

impl CycleSummary {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> WorkerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run one playlist-generation cycle
#[instrument(skip(state, request))]
pub async fn run(state: &AppState, request: &CycleRequest) -> WorkerResult<CycleSummary> {
    let user = state.spotify.get_current_user(&request.session).await?;
    info!(user_id = %user.id, "Starting playlist-generation cycle");

    let job = UltimatePlaylistJob {
        user_id: user.id.clone(),
        playlist_id: request.playlist_id.clone(),
    };
    let outcome = ultimate_playlist::execute(state, &request.session, &job).await?;
    let profile = vibe_profile::execute(state, &request.session, &user, &outcome.tracks).await;

    let compatibility = match &request.peer_session {
        Some(peer_session) => match peer_profile(state, peer_session).await {
            Ok(peer_profile) => {
                let breakdown = compatibility_breakdown(&profile, &peer_profile);
                info!(
                    peer_id = %peer_profile.user_id,
                    score = breakdown.score,
                    "Scored compatibility with peer"
                );
                Some(PeerCompatibility {
                    peer: ProfileSummary::from(&peer_profile),
                    compatible: breakdown.score >= CALIBRATION.compatible_threshold(),
                    breakdown,
                })
            }
            Err(e) => {
                warn!(error = %e, "Failed to build peer profile, skipping compatibility");
                None
            }
        },
        None => None,
    };

    Ok(CycleSummary {
        profile: ProfileSummary::from(&profile),
        unique_tracks: outcome.tracks.len(),
        playlist: outcome.playlist,
        compatibility,
        generated_at: Utc::now(),
    })
}

/// Build a profile for the peer without writing any playlist
async fn peer_profile(state: &AppState, session: &SpotifySession) -> WorkerResult<VibeProfile> {
    let peer = state.spotify.get_current_user(session).await?;
    let windows = ultimate_playlist::fetch_windows(state, session).await;
    let tracks = aggregate(&windows);
    Ok(vibe_profile::execute(state, session, &peer, &tracks).await)
}
