//! Integration tests for the ultimate playlist job
//!
//! Tests cover:
//! - Creating a playlist on first run and replacing its contents afterwards
//! - Windows that fail to load
//! - Users without top tracks
//! - The per-request URI cap

mod common;

use assert_matches::assert_matches;
use common::{mock_windows, session, test_state};
use vibecheck_engine::TimeWindow;
use vibecheck_test_utils::{MockSpotifyServer, TrackFixture};
use vibecheck_worker::error::WorkerError;
use vibecheck_worker::jobs::ultimate_playlist::{self, UltimatePlaylistJob, PLAYLIST_NAME};

fn as_refs(ids: &[String]) -> Vec<&str> {
    ids.iter().map(String::as_str).collect()
}

fn job(playlist_id: Option<&str>) -> UltimatePlaylistJob {
    UltimatePlaylistJob {
        user_id: "user-1".to_string(),
        playlist_id: playlist_id.map(str::to_string),
    }
}

#[tokio::test]
async fn test_creates_playlist_on_first_run() {
    let server = MockSpotifyServer::start().await;
    mock_windows(&server, &["t1", "t2"], &["t2", "t3"], &["t3"]).await;
    server.mock_create_playlist("user-1", "pl-new").await;
    server.mock_add_tracks("pl-new").await;

    let outcome = ultimate_playlist::execute(&test_state(&server), &session(), &job(None))
        .await
        .unwrap();

    let ranking: Vec<(&str, u64)> = outcome
        .tracks
        .iter()
        .map(|t| (t.track.id.as_str(), t.score))
        .collect();
    assert_eq!(ranking, vec![("t1", 200), ("t2", 200), ("t3", 75)]);

    let playlist = outcome.playlist.expect("playlist should be written");
    assert_eq!(playlist.playlist_id, "pl-new");
    assert!(playlist.created);
    assert_eq!(playlist.track_count, 3);
    assert_eq!(playlist.snapshot_id, "snapshot-pl-new");

    assert_eq!(
        server.received_playlist_uris("pl-new").await,
        vec![vec![
            "spotify:track:t1".to_string(),
            "spotify:track:t2".to_string(),
            "spotify:track:t3".to_string(),
        ]]
    );
}

#[tokio::test]
async fn test_new_playlist_is_private_and_named() {
    let server = MockSpotifyServer::start().await;
    mock_windows(&server, &["t1"], &[], &[]).await;
    server.mock_create_playlist("user-1", "pl-new").await;
    server.mock_add_tracks("pl-new").await;

    ultimate_playlist::execute(&test_state(&server), &session(), &job(None))
        .await
        .unwrap();

    let bodies = server.received_bodies("/users/user-1/playlists").await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["name"], PLAYLIST_NAME);
    assert_eq!(bodies[0]["public"], false);
}

#[tokio::test]
async fn test_replaces_known_playlist() {
    let server = MockSpotifyServer::start().await;
    mock_windows(&server, &["t1"], &["t2"], &[]).await;
    server.mock_replace_tracks("pl-1").await;

    let outcome = ultimate_playlist::execute(&test_state(&server), &session(), &job(Some("pl-1")))
        .await
        .unwrap();

    let playlist = outcome.playlist.unwrap();
    assert_eq!(playlist.playlist_id, "pl-1");
    assert!(!playlist.created);
    assert_eq!(playlist.snapshot_id, "snapshot-pl-1");
    assert_eq!(server.request_count("/users/user-1/playlists").await, 0);
    assert_eq!(
        server.received_playlist_uris("pl-1").await,
        vec![vec!["spotify:track:t1".to_string(), "spotify:track:t2".to_string()]]
    );
}

#[tokio::test]
async fn test_blank_playlist_id_creates_new_playlist() {
    let server = MockSpotifyServer::start().await;
    mock_windows(&server, &["t1"], &[], &[]).await;
    server.mock_create_playlist("user-1", "pl-new").await;
    server.mock_add_tracks("pl-new").await;

    let outcome = ultimate_playlist::execute(&test_state(&server), &session(), &job(Some("  ")))
        .await
        .unwrap();

    assert!(outcome.playlist.unwrap().created);
}

#[tokio::test]
async fn test_failed_window_counts_as_empty() {
    let server = MockSpotifyServer::start().await;
    server
        .mock_top_tracks(TimeWindow::Recent, vec![TrackFixture::new("t1")])
        .await;
    server.mock_top_tracks_failure(TimeWindow::Medium, 500).await;
    server
        .mock_top_tracks(TimeWindow::LongTerm, vec![TrackFixture::new("t3")])
        .await;
    server.mock_create_playlist("user-1", "pl-new").await;
    server.mock_add_tracks("pl-new").await;

    let outcome = ultimate_playlist::execute(&test_state(&server), &session(), &job(None))
        .await
        .unwrap();

    let ranking: Vec<(&str, u64)> = outcome
        .tracks
        .iter()
        .map(|t| (t.track.id.as_str(), t.score))
        .collect();
    assert_eq!(ranking, vec![("t1", 100), ("t3", 25)]);
    assert_eq!(outcome.playlist.unwrap().track_count, 2);
}

#[tokio::test]
async fn test_no_tracks_skips_playlist() {
    let server = MockSpotifyServer::start().await;
    mock_windows(&server, &[], &[], &[]).await;

    let outcome = ultimate_playlist::execute(&test_state(&server), &session(), &job(None))
        .await
        .unwrap();

    assert!(outcome.tracks.is_empty());
    assert!(outcome.playlist.is_none());
    assert_eq!(server.request_count("/users/user-1/playlists").await, 0);
}

#[tokio::test]
async fn test_rejected_token_yields_no_playlist() {
    let server = MockSpotifyServer::start().await;
    server.mock_unauthorized().await;

    let outcome = ultimate_playlist::execute(&test_state(&server), &session(), &job(None))
        .await
        .unwrap();

    assert!(outcome.playlist.is_none());
    assert_eq!(server.request_count("/me/top/tracks").await, 3);
}

#[tokio::test]
async fn test_playlist_holds_first_hundred_tracks() {
    let server = MockSpotifyServer::start().await;
    let recent: Vec<String> = (0..50).map(|i| format!("r{}", i)).collect();
    let medium: Vec<String> = (0..50).map(|i| format!("m{}", i)).collect();
    let long_term: Vec<String> = (0..50).map(|i| format!("l{}", i)).collect();
    mock_windows(&server, &as_refs(&recent), &as_refs(&medium), &as_refs(&long_term)).await;
    server.mock_create_playlist("user-1", "pl-new").await;
    server.mock_add_tracks("pl-new").await;

    let outcome = ultimate_playlist::execute(&test_state(&server), &session(), &job(None))
        .await
        .unwrap();

    assert_eq!(outcome.tracks.len(), 150);
    assert_eq!(outcome.playlist.unwrap().track_count, 100);

    let sent = server.received_playlist_uris("pl-new").await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].len(), 100);
    assert_eq!(sent[0][0], "spotify:track:r0");
}

#[tokio::test]
async fn test_empty_user_id_is_rejected() {
    let server = MockSpotifyServer::start().await;
    let job = UltimatePlaylistJob {
        user_id: " ".to_string(),
        playlist_id: None,
    };

    let result = ultimate_playlist::execute(&test_state(&server), &session(), &job).await;

    assert_matches!(result, Err(WorkerError::InvalidJobData(_)));
    assert_eq!(server.request_count("/me/top/tracks").await, 0);
}
