//! Ultimate playlist job
//!
//! Merges the user's top tracks from the three listening-history windows into
//! one ranking and writes its head into a private playlist.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use vibecheck_engine::{aggregate, playlist_uris, AggregatedTrack, TimeWindow, WindowedTracks};
use vibecheck_spotify_client::{NewPlaylist, SpotifySession};

use crate::error::{WorkerError, WorkerResult};
use crate::AppState;

/// Name of the playlist created for each user
pub const PLAYLIST_NAME: &str = "Vibecheck.me - Ultimate Playlist";

/// Description of the playlist created for each user
pub const PLAYLIST_DESCRIPTION: &str =
    "Your ultimate playlist created from your top tracks across all time periods";

/// Ultimate playlist job payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UltimatePlaylistJob {
    /// Spotify user owning the playlist
    pub user_id: String,

    /// Playlist from an earlier run; `None` creates a new one
    pub playlist_id: Option<String>,
}

/// Result of writing the playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSync {
    pub playlist_id: String,
    /// True when this run created the playlist
    pub created: bool,
    pub track_count: usize,
    pub snapshot_id: String,
}

/// What one run of the job produced
#[derive(Debug, Clone, Serialize)]
pub struct UltimatePlaylistOutcome {
    /// Full aggregated ranking, best first
    pub tracks: Vec<AggregatedTrack>,
    /// `None` when the user had no top tracks or the write failed
    pub playlist: Option<PlaylistSync>,
}

/// Fetch all three windows for the session's user
///
/// A window that fails to load is logged and contributes an empty list.
#[instrument(skip(state, session))]
pub async fn fetch_windows(state: &AppState, session: &SpotifySession) -> WindowedTracks {
    let requests = TimeWindow::ALL
        .into_iter()
        .map(|window| async move {
            let result = state.spotify.get_top_tracks(session, window, None).await;
            (window, result)
        });

    let mut windows = WindowedTracks::default();
    for (window, result) in join_all(requests).await {
        match result {
            Ok(tracks) => *windows.window_mut(window) = tracks,
            Err(e) => {
                warn!(
                    window = %window,
                    error = %e,
                    "Failed to fetch top tracks, treating window as empty"
                );
            }
        }
    }

    windows
}

/// Execute the ultimate playlist job
#[instrument(skip(state, session, job), fields(user_id = %job.user_id))]
pub async fn execute(
    state: &AppState,
    session: &SpotifySession,
    job: &UltimatePlaylistJob,
) -> WorkerResult<UltimatePlaylistOutcome> {
    if job.user_id.trim().is_empty() {
        return Err(WorkerError::InvalidJobData(
            "user id cannot be empty".to_string(),
        ));
    }

    let windows = fetch_windows(state, session).await;
    let tracks = aggregate(&windows);

    if tracks.is_empty() {
        info!("No top tracks found, skipping playlist update");
        return Ok(UltimatePlaylistOutcome {
            tracks,
            playlist: None,
        });
    }

    let uris = playlist_uris(&tracks);
    let playlist = match sync_playlist(state, session, job, &uris).await {
        Ok(playlist) => playlist,
        Err(e) => {
            warn!(
                error = %e,
                unique_tracks = tracks.len(),
                "Failed to write ultimate playlist, keeping ranking"
            );
            return Ok(UltimatePlaylistOutcome {
                tracks,
                playlist: None,
            });
        }
    };

    info!(
        playlist_id = %playlist.playlist_id,
        created = playlist.created,
        track_count = playlist.track_count,
        unique_tracks = tracks.len(),
        "Ultimate playlist updated"
    );

    Ok(UltimatePlaylistOutcome {
        tracks,
        playlist: Some(playlist),
    })
}

/// Create the playlist and fill it, or replace the contents of a known one
async fn sync_playlist(
    state: &AppState,
    session: &SpotifySession,
    job: &UltimatePlaylistJob,
    uris: &[String],
) -> WorkerResult<PlaylistSync> {
    let known_id = job
        .playlist_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    match known_id {
        Some(playlist_id) => {
            debug!(playlist_id, "Replacing ultimate playlist contents");
            let snapshot_id = state
                .spotify
                .replace_playlist_tracks(session, playlist_id, uris)
                .await?;
            Ok(PlaylistSync {
                playlist_id: playlist_id.to_string(),
                created: false,
                track_count: uris.len(),
                snapshot_id,
            })
        }
        None => {
            let settings = NewPlaylist {
                name: PLAYLIST_NAME.to_string(),
                description: PLAYLIST_DESCRIPTION.to_string(),
                public: false,
            };
            let playlist = state
                .spotify
                .create_playlist(session, &job.user_id, &settings)
                .await?;
            let snapshot_id = state
                .spotify
                .add_tracks_to_playlist(session, &playlist.id, uris)
                .await?;
            Ok(PlaylistSync {
                playlist_id: playlist.id,
                created: true,
                track_count: uris.len(),
                snapshot_id,
            })
        }
    }
}
