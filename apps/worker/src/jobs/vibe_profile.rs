//! Vibe profile job
//!
//! Top-tracks payloads carry simplified artists without genres, so artists
//! are first looked up in batches to get genre tags. Lookup failures only cost
//! genres; the profile is always built.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};
use vibecheck_engine::{AggregatedTrack, VibeProfile, VibeProfileBuilder};
use vibecheck_spotify_client::{CurrentUser, SpotifySession, MAX_ARTIST_IDS};

use crate::AppState;

/// Build the vibe profile for `user` from their aggregated ranking
#[instrument(skip(state, session, user, tracks), fields(user_id = %user.id, track_count = tracks.len()))]
pub async fn execute(
    state: &AppState,
    session: &SpotifySession,
    user: &CurrentUser,
    tracks: &[AggregatedTrack],
) -> VibeProfile {
    let config = state.spotify_config();

    let enriched;
    let tracks = if config.fetch_artist_genres {
        enriched = enrich_genres(state, session, tracks).await;
        enriched.as_slice()
    } else {
        tracks
    };

    let profile = VibeProfileBuilder::new(state.spotify.feature_source(session))
        .with_concurrency(config.feature_concurrency)
        .build(&user.id, user.name(), tracks)
        .await;

    if profile.is_degraded() {
        warn!(
            requested = profile.requested_count(),
            fallback = profile.fallback_count(),
            "Vibe profile built with neutral fallbacks"
        );
    }

    profile
}

/// Fill in genres for artists that arrived without any
///
/// Artist ids are looked up once each, in batches of [`MAX_ARTIST_IDS`]. A
/// failed batch is logged and its artists keep their empty genre lists.
pub async fn enrich_genres(
    state: &AppState,
    session: &SpotifySession,
    tracks: &[AggregatedTrack],
) -> Vec<AggregatedTrack> {
    let mut seen: HashSet<&str> = HashSet::new();
    let artist_ids: Vec<String> = tracks
        .iter()
        .flat_map(|t| t.track.artists.iter())
        .filter(|a| a.genres.is_empty())
        .filter_map(|a| a.id.as_deref())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect();

    let mut genres_by_id: HashMap<String, Vec<String>> = HashMap::new();
    for batch in artist_ids.chunks(MAX_ARTIST_IDS) {
        match state.spotify.get_artists(session, batch).await {
            Ok(artists) => {
                for artist in artists {
                    if let Some(id) = artist.id {
                        genres_by_id.insert(id, artist.genres);
                    }
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    batch_size = batch.len(),
                    "Artist genre lookup failed, continuing without genres"
                );
            }
        }
    }

    let mut enriched = tracks.to_vec();
    for artist in enriched
        .iter_mut()
        .flat_map(|t| t.track.artists.iter_mut())
        .filter(|a| a.genres.is_empty())
    {
        if let Some(genres) = artist.id.as_ref().and_then(|id| genres_by_id.get(id)) {
            artist.genres = genres.clone();
        }
    }

    debug!(
        requested = artist_ids.len(),
        resolved = genres_by_id.len(),
        "Enriched artist genres"
    );

    enriched
}
