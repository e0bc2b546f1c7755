//! Common test utilities for worker integration tests

#![allow(dead_code)]

use vibecheck_engine::{AggregatedTrack, Artist, TimeWindow, Track, WindowAppearance};
use vibecheck_shared_config::SpotifyConfig;
use vibecheck_spotify_client::{SpotifyClient, SpotifySession};
use vibecheck_test_utils::{MockSpotifyServer, TrackFixture};
use vibecheck_worker::AppState;

pub use vibecheck_test_utils::AudioFeaturesFixture;

/// State pointed at the mock server, with retries disabled
pub fn test_state(server: &MockSpotifyServer) -> AppState {
    test_state_with(server, |_| {})
}

/// Like [`test_state`], after adjusting the configuration
pub fn test_state_with(server: &MockSpotifyServer, adjust: impl FnOnce(&mut SpotifyConfig)) -> AppState {
    let mut config = SpotifyConfig::with_url(server.url());
    adjust(&mut config);
    let client = SpotifyClient::new(&config)
        .expect("client should build")
        .with_retry_config(0, 1);
    AppState::from_client(client)
}

/// Session the mock server accepts
pub fn session() -> SpotifySession {
    SpotifySession::new(MockSpotifyServer::ACCESS_TOKEN)
}

/// Mount all three windows from lists of track ids
pub async fn mock_windows(
    server: &MockSpotifyServer,
    recent: &[&str],
    medium: &[&str],
    long_term: &[&str],
) {
    for (window, ids) in [
        (TimeWindow::Recent, recent),
        (TimeWindow::Medium, medium),
        (TimeWindow::LongTerm, long_term),
    ] {
        let tracks = ids.iter().map(|id| TrackFixture::new(id)).collect();
        server.mock_top_tracks(window, tracks).await;
    }
}

/// Aggregated tracks `id` by artist `artist-{id}`, without genres or features
pub fn aggregated(ids: &[&str]) -> Vec<AggregatedTrack> {
    let len = ids.len() as u64;
    ids.iter()
        .enumerate()
        .map(|(i, id)| AggregatedTrack {
            track: Track {
                id: id.to_string(),
                name: format!("Track {}", id),
                artists: vec![Artist {
                    id: Some(format!("artist-{}", id)),
                    name: format!("Artist {}", id),
                    genres: Vec::new(),
                }],
                uri: format!("spotify:track:{}", id),
                audio_features: None,
            },
            score: (len - i as u64) * TimeWindow::Recent.weight(),
            appearances: vec![WindowAppearance {
                window: TimeWindow::Recent,
                rank: i + 1,
            }],
        })
        .collect()
}
