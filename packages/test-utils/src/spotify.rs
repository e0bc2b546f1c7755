//! Mock Spotify Web API server for testing clients and jobs
//!
//! Provides a [`MockSpotifyServer`] that serves the handful of endpoints the
//! vibecheck client calls: profile, top tracks, audio features, artists and
//! playlist writes.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::json;
use vibecheck_engine::TimeWindow;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::fixtures::{AudioFeaturesFixture, TrackFixture};

/// Mock Spotify Web API server
///
/// Wraps a [`wiremock::MockServer`]. Every success mock only answers
/// requests carrying `Authorization: Bearer` [`MockSpotifyServer::ACCESS_TOKEN`].
///
/// # Example
///
/// ```rust,ignore
/// use vibecheck_test_utils::{MockSpotifyServer, TrackFixture};
///
/// #[tokio::test]
/// async fn test_top_tracks() {
///     let server = MockSpotifyServer::start().await;
///     server
///         .mock_top_tracks(TimeWindow::Recent, vec![TrackFixture::new("t1")])
///         .await;
///
///     // Point SpotifyConfig::with_url(server.url()) at it
/// }
/// ```
pub struct MockSpotifyServer {
    server: MockServer,
}

impl MockSpotifyServer {
    /// Token every success mock expects
    pub const ACCESS_TOKEN: &'static str = "test-access-token";

    /// Start a new mock Spotify server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    fn bearer() -> String {
        format!("Bearer {}", Self::ACCESS_TOKEN)
    }

    /// Mount a mock for `GET /me`
    pub async fn mock_current_user(&self, user_id: &str, display_name: &str) {
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("Authorization", Self::bearer().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": user_id,
                "display_name": display_name,
                "type": "user",
                "uri": format!("spotify:user:{}", user_id)
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for one window of `GET /me/top/tracks`
    pub async fn mock_top_tracks(&self, window: TimeWindow, tracks: Vec<TrackFixture>) {
        let items: Vec<serde_json::Value> = tracks.iter().map(|t| t.to_json()).collect();

        Mock::given(method("GET"))
            .and(path("/me/top/tracks"))
            .and(query_param("time_range", window.time_range()))
            .and(header("Authorization", Self::bearer().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": items,
                "total": items.len(),
                "limit": 50,
                "offset": 0,
                "next": null,
                "previous": null
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a failing response for one window of `GET /me/top/tracks`
    pub async fn mock_top_tracks_failure(&self, window: TimeWindow, status: u16) {
        Mock::given(method("GET"))
            .and(path("/me/top/tracks"))
            .and(query_param("time_range", window.time_range()))
            .respond_with(error_response(status, "Service unavailable"))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for `GET /audio-features`
    ///
    /// Answers each requested id with its fixture, or `null` when no fixture
    /// has that id.
    pub async fn mock_audio_features(&self, features: Vec<AudioFeaturesFixture>) {
        let by_id = features
            .into_iter()
            .map(|f| (f.id.clone(), f.to_json()))
            .collect();

        Mock::given(method("GET"))
            .and(path("/audio-features"))
            .and(header("Authorization", Self::bearer().as_str()))
            .respond_with(LookupResponder {
                key: "audio_features",
                by_id,
            })
            .mount(&self.server)
            .await;
    }

    /// Mount a failing response for `GET /audio-features`
    pub async fn mock_audio_features_failure(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/audio-features"))
            .respond_with(error_response(status, "Audio features unavailable"))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for `GET /artists` from `(artist id, genres)` pairs
    ///
    /// Unknown ids are answered with `null`.
    pub async fn mock_artists(&self, artists: Vec<(&str, Vec<&str>)>) {
        let by_id = artists
            .into_iter()
            .map(|(id, genres)| {
                let artist = json!({
                    "id": id,
                    "name": format!("Artist {}", id),
                    "type": "artist",
                    "genres": genres,
                    "popularity": 50
                });
                (id.to_string(), artist)
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/artists"))
            .and(header("Authorization", Self::bearer().as_str()))
            .respond_with(LookupResponder {
                key: "artists",
                by_id,
            })
            .mount(&self.server)
            .await;
    }

    /// Mount a failing response for `GET /artists`
    pub async fn mock_artists_failure(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/artists"))
            .respond_with(error_response(status, "Artists unavailable"))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for `POST /users/{user_id}/playlists`
    ///
    /// The created playlist echoes the requested name.
    pub async fn mock_create_playlist(&self, user_id: &str, playlist_id: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/users/{}/playlists", user_id)))
            .and(header("Authorization", Self::bearer().as_str()))
            .respond_with(CreatePlaylistResponder {
                playlist_id: playlist_id.to_string(),
            })
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for `POST /playlists/{playlist_id}/tracks`
    pub async fn mock_add_tracks(&self, playlist_id: &str) {
        self.mock_playlist_tracks("POST", playlist_id, 201).await;
    }

    /// Mount a mock for `PUT /playlists/{playlist_id}/tracks`
    pub async fn mock_replace_tracks(&self, playlist_id: &str) {
        self.mock_playlist_tracks("PUT", playlist_id, 200).await;
    }

    async fn mock_playlist_tracks(&self, http_method: &str, playlist_id: &str, status: u16) {
        Mock::given(method(http_method))
            .and(path(format!("/playlists/{}/tracks", playlist_id)))
            .and(header("Authorization", Self::bearer().as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "snapshot_id": format!("snapshot-{}", playlist_id)
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a 401 for every GET, as Spotify answers an expired token
    pub async fn mock_unauthorized(&self) {
        Mock::given(method("GET"))
            .respond_with(error_response(401, "The access token expired"))
            .mount(&self.server)
            .await;
    }

    /// Mount a 429 with a `Retry-After` header for `endpoint`
    pub async fn mock_rate_limited(&self, endpoint: &str, retry_after_secs: u64) {
        Mock::given(path(endpoint))
            .respond_with(
                error_response(429, "API rate limit exceeded")
                    .insert_header("Retry-After", retry_after_secs.to_string().as_str()),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of requests received for an exact path
    pub async fn request_count(&self, endpoint: &str) -> usize {
        self.received(endpoint).await.len()
    }

    /// Id batches sent to `GET /audio-features`, in arrival order
    pub async fn audio_feature_batches(&self) -> Vec<Vec<String>> {
        self.received("/audio-features")
            .await
            .iter()
            .map(requested_ids)
            .collect()
    }

    /// URI lists sent to `/playlists/{playlist_id}/tracks`, in arrival order
    pub async fn received_playlist_uris(&self, playlist_id: &str) -> Vec<Vec<String>> {
        #[derive(Deserialize)]
        struct UrisBody {
            uris: Vec<String>,
        }

        self.received_bodies(&format!("/playlists/{}/tracks", playlist_id))
            .await
            .into_iter()
            .filter_map(|body| serde_json::from_value::<UrisBody>(body).ok())
            .map(|b| b.uris)
            .collect()
    }

    /// JSON bodies received for an exact path, in arrival order
    pub async fn received_bodies(&self, endpoint: &str) -> Vec<serde_json::Value> {
        self.received(endpoint)
            .await
            .iter()
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }

    async fn received(&self, endpoint: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == endpoint)
            .collect()
    }
}

fn error_response(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": {
            "status": status,
            "message": message
        }
    }))
}

/// Comma-separated `ids` query parameter of a request
fn requested_ids(request: &Request) -> Vec<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == "ids")
        .map(|(_, v)| {
            v.split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Answers `?ids=` lookups positionally under `key`, with `null` for misses
struct LookupResponder {
    key: &'static str,
    by_id: HashMap<String, serde_json::Value>,
}

impl Respond for LookupResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let items: Vec<serde_json::Value> = requested_ids(request)
            .iter()
            .map(|id| self.by_id.get(id).cloned().unwrap_or(serde_json::Value::Null))
            .collect();

        let mut body = serde_json::Map::new();
        body.insert(self.key.to_string(), serde_json::Value::Array(items));
        ResponseTemplate::new(200).set_body_json(body)
    }
}

struct CreatePlaylistResponder {
    playlist_id: String,
}

impl Respond for CreatePlaylistResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let name = serde_json::from_slice::<serde_json::Value>(&request.body)
            .ok()
            .and_then(|body| body["name"].as_str().map(str::to_string))
            .unwrap_or_default();

        ResponseTemplate::new(201).set_body_json(json!({
            "id": self.playlist_id,
            "name": name,
            "public": false,
            "uri": format!("spotify:playlist:{}", self.playlist_id)
        }))
    }
}
