//! Integration tests for the full playlist-generation cycle

mod common;

use assert_matches::assert_matches;
use common::{mock_windows, session, test_state, AudioFeaturesFixture};
use vibecheck_spotify_client::{SpotifyError, SpotifySession};
use vibecheck_test_utils::MockSpotifyServer;
use vibecheck_worker::error::WorkerError;
use vibecheck_worker::jobs::cycle::{self, CycleRequest};

/// Mount a user with three tracks, features and genres
async fn mock_user(server: &MockSpotifyServer) {
    server.mock_current_user("user-1", "Ada").await;
    mock_windows(server, &["t1", "t2"], &["t2", "t3"], &["t3"]).await;
    server
        .mock_audio_features(vec![
            AudioFeaturesFixture::new("t1").energy(0.9).valence(0.8),
            AudioFeaturesFixture::new("t2").energy(0.5),
            AudioFeaturesFixture::new("t3").tempo(90.0),
        ])
        .await;
    server
        .mock_artists(vec![
            ("artist-t1", vec!["synthpop"]),
            ("artist-t2", vec!["synthpop", "new wave"]),
        ])
        .await;
}

fn request() -> CycleRequest {
    CycleRequest {
        session: session(),
        peer_session: None,
        playlist_id: None,
    }
}

#[tokio::test]
async fn test_cycle_creates_playlist_and_profile() {
    let server = MockSpotifyServer::start().await;
    mock_user(&server).await;
    server.mock_create_playlist("user-1", "pl-new").await;
    server.mock_add_tracks("pl-new").await;

    let summary = cycle::run(&test_state(&server), &request()).await.unwrap();

    assert_eq!(summary.profile.user_id, "user-1");
    assert_eq!(summary.profile.display_name, "Ada");
    assert_eq!(summary.profile.requested_tracks, 3);
    assert_eq!(summary.profile.fallback_tracks, 0);
    assert_eq!(summary.profile.top_genres, vec!["synthpop", "new wave"]);
    assert_eq!(summary.unique_tracks, 3);
    assert!(summary.compatibility.is_none());

    let playlist = summary.playlist.as_ref().unwrap();
    assert_eq!(playlist.playlist_id, "pl-new");
    assert!(playlist.created);
}

#[tokio::test]
async fn test_cycle_summary_serializes() {
    let server = MockSpotifyServer::start().await;
    mock_user(&server).await;
    server.mock_replace_tracks("pl-1").await;

    let request = CycleRequest {
        playlist_id: Some("pl-1".to_string()),
        ..request()
    };
    let summary = cycle::run(&test_state(&server), &request).await.unwrap();

    let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
    assert_eq!(json["profile"]["user_id"], "user-1");
    assert_eq!(json["playlist"]["playlist_id"], "pl-1");
    assert_eq!(json["playlist"]["created"], false);
    assert_eq!(json["unique_tracks"], 3);
    assert!(json["compatibility"].is_null());
    assert!(json["generated_at"].is_string());
}

#[tokio::test]
async fn test_cycle_scores_peer() {
    let server = MockSpotifyServer::start().await;
    mock_user(&server).await;
    server.mock_create_playlist("user-1", "pl-new").await;
    server.mock_add_tracks("pl-new").await;

    // Same account on both sides: identical profiles
    let request = CycleRequest {
        peer_session: Some(session()),
        ..request()
    };
    let summary = cycle::run(&test_state(&server), &request).await.unwrap();

    let compatibility = summary.compatibility.expect("peer should be scored");
    assert_eq!(compatibility.peer.user_id, "user-1");
    assert_eq!(compatibility.breakdown.score, 100);
    assert!(compatibility.compatible);

    // The peer's playlists are never written
    assert_eq!(server.request_count("/users/user-1/playlists").await, 1);
}

#[tokio::test]
async fn test_cycle_stops_on_rejected_token() {
    let server = MockSpotifyServer::start().await;
    server.mock_unauthorized().await;

    let result = cycle::run(&test_state(&server), &request()).await;

    let err = result.unwrap_err();
    assert!(err.requires_reauthorization());
    assert_matches!(err, WorkerError::Spotify(SpotifyError::Unauthorized(_)));
    assert_eq!(server.request_count("/me/top/tracks").await, 0);
}

#[tokio::test]
async fn test_cycle_with_degraded_features_still_succeeds() {
    let server = MockSpotifyServer::start().await;
    server.mock_current_user("user-1", "Ada").await;
    mock_windows(&server, &["t1"], &[], &[]).await;
    server.mock_audio_features_failure(503).await;
    server.mock_artists(vec![]).await;
    server.mock_create_playlist("user-1", "pl-new").await;
    server.mock_add_tracks("pl-new").await;

    let summary = cycle::run(&test_state(&server), &request()).await.unwrap();

    assert_eq!(summary.profile.requested_tracks, 1);
    assert_eq!(summary.profile.fallback_tracks, 1);
    assert_eq!(summary.profile.average_features.tempo, 120.0);
    assert!(summary.playlist.is_some());
}

#[tokio::test]
async fn test_cycle_keeps_profile_when_playlist_write_fails() {
    let server = MockSpotifyServer::start().await;
    mock_user(&server).await;
    // No playlist mocks: the create request answers 404

    let summary = cycle::run(&test_state(&server), &request()).await.unwrap();

    assert!(summary.playlist.is_none());
    assert_eq!(summary.unique_tracks, 3);
    assert_eq!(summary.profile.user_id, "user-1");
    assert_eq!(summary.profile.top_genres, vec!["synthpop", "new wave"]);
    assert_eq!(server.request_count("/users/user-1/playlists").await, 1);
}

#[tokio::test]
async fn test_cycle_skips_compatibility_when_peer_fails() {
    let server = MockSpotifyServer::start().await;
    mock_user(&server).await;
    server.mock_create_playlist("user-1", "pl-new").await;
    server.mock_add_tracks("pl-new").await;

    let request = CycleRequest {
        peer_session: Some(SpotifySession::with_expiry("peer-token", -60)),
        ..request()
    };
    let summary = cycle::run(&test_state(&server), &request).await.unwrap();

    assert!(summary.compatibility.is_none());
    assert_eq!(summary.profile.user_id, "user-1");
    assert!(summary.playlist.is_some());
    assert_eq!(server.request_count("/me").await, 1);
}
