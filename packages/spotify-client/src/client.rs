//! Spotify Web API client implementation

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use vibecheck_engine::{Artist, AudioFeatures, TimeWindow, Track};
use vibecheck_shared_config::{SpotifyConfig, MAX_TOP_TRACKS_LIMIT};

use crate::error::{SpotifyError, SpotifyResult};
use crate::models::{
    ArtistsResponse, AudioFeaturesResponse, CurrentUser, ErrorResponse, NewPlaylist, Playlist,
    SnapshotResponse, TopTracksResponse, TrackUrisRequest,
};
use crate::session::SpotifySession;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Maximum track ids per audio-features request
pub const MAX_AUDIO_FEATURE_IDS: usize = 100;

/// Maximum artist ids per artists request
pub const MAX_ARTIST_IDS: usize = 50;

/// Maximum URIs per playlist-tracks request
pub const MAX_PLAYLIST_URIS: usize = 100;

/// Base delay for exponential backoff (milliseconds)
const RETRY_BASE_DELAY_MS: u64 = 100;

/// Longest Retry-After honoured before giving up on a rate limit (seconds)
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Spotify Web API client
///
/// Holds no user credentials: every call takes the caller's
/// [`SpotifySession`].
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http_client: Client,
    config: SpotifyConfig,
    max_retries: u32,
    retry_base_delay_ms: u64,
}

impl SpotifyClient {
    /// Create a new Spotify client from configuration
    pub fn new(config: &SpotifyConfig) -> SpotifyResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent("Vibecheck/1.0")
            .build()?;

        Ok(Self {
            http_client,
            config: config.clone(),
            max_retries: config.max_retries,
            retry_base_delay_ms: RETRY_BASE_DELAY_MS,
        })
    }

    /// Set retry configuration
    pub fn with_retry_config(mut self, max_retries: u32, base_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    /// Execute an operation with retry logic for transient failures
    async fn with_retry<T, F, Fut>(&self, operation: F) -> SpotifyResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = SpotifyResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(SpotifyError::RateLimited {
                    retry_after_secs: Some(secs),
                }) if secs > MAX_RETRY_AFTER_SECS => {
                    warn!(
                        retry_after_secs = secs,
                        "Spotify rate limit outlasts the retry window, giving up"
                    );
                    return Err(SpotifyError::RateLimited {
                        retry_after_secs: Some(secs),
                    });
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay_ms = match &e {
                        SpotifyError::RateLimited {
                            retry_after_secs: Some(secs),
                        } => secs * 1000,
                        _ => self.backoff_delay_ms(attempt),
                    };
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Spotify request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Exponential backoff for `attempt`, saturating instead of overflowing
    fn backoff_delay_ms(&self, attempt: u32) -> u64 {
        2u64.checked_pow(attempt)
            .map_or(u64::MAX, |factor| self.retry_base_delay_ms.saturating_mul(factor))
    }

    /// Build an authorized request for `path`
    fn request(
        &self,
        method: Method,
        path: &str,
        session: &SpotifySession,
    ) -> SpotifyResult<RequestBuilder> {
        let token = session.bearer_token()?;
        Ok(self
            .http_client
            .request(method, self.config.endpoint(path))
            .bearer_auth(token))
    }

    /// Send a request and decode a successful JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> SpotifyResult<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SpotifyError::Timeout
            } else {
                SpotifyError::Http(e)
            }
        })?;

        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Map non-success responses onto error variants
    async fn check_status(response: Response) -> SpotifyResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            warn!(?retry_after_secs, "Spotify API rate limited");
            return Err(SpotifyError::RateLimited { retry_after_secs });
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());

        if status == StatusCode::UNAUTHORIZED {
            return Err(SpotifyError::Unauthorized(message));
        }

        Err(SpotifyError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Validate a batch size for an endpoint
    fn validate_batch(what: &str, len: usize, max: usize) -> SpotifyResult<()> {
        if len == 0 {
            return Err(SpotifyError::InvalidInput(format!(
                "at least one {} is required",
                what
            )));
        }
        if len > max {
            return Err(SpotifyError::InvalidInput(format!(
                "too many {}s ({} > {})",
                what, len, max
            )));
        }
        Ok(())
    }

    /// Get the profile of the session's user
    #[instrument(skip(self, session))]
    pub async fn get_current_user(&self, session: &SpotifySession) -> SpotifyResult<CurrentUser> {
        self.with_retry(|| async { self.send(self.request(Method::GET, "me", session)?).await })
            .await
    }

    /// Get the user's top tracks for one listening-history window
    ///
    /// # Arguments
    /// * `window` - Listening-history range
    /// * `limit` - Number of tracks (default: configured limit, max 50)
    ///
    /// Tracks without an id (local files) are skipped.
    ///
    /// # Errors
    /// - `SpotifyError::InvalidInput` - If the limit is 0 or above 50
    /// - `SpotifyError::Unauthorized` - If the token is rejected
    /// - `SpotifyError::Api` - If Spotify returns an error
    #[instrument(skip(self, session))]
    pub async fn get_top_tracks(
        &self,
        session: &SpotifySession,
        window: TimeWindow,
        limit: Option<u32>,
    ) -> SpotifyResult<Vec<Track>> {
        let limit = limit.unwrap_or(self.config.top_tracks_limit);
        if limit == 0 || limit > MAX_TOP_TRACKS_LIMIT {
            return Err(SpotifyError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_TOP_TRACKS_LIMIT
            )));
        }
        let limit_str = limit.to_string();

        debug!(time_range = window.time_range(), limit, "Fetching top tracks");

        let response: TopTracksResponse = self
            .with_retry(|| async {
                let request = self
                    .request(Method::GET, "me/top/tracks", session)?
                    .query(&[("time_range", window.time_range()), ("limit", limit_str.as_str())]);
                self.send(request).await
            })
            .await?;

        let returned = response.items.len();
        let tracks: Vec<Track> = response
            .items
            .into_iter()
            .filter_map(|raw| raw.into_track())
            .collect();

        if tracks.len() < returned {
            debug!(
                skipped = returned - tracks.len(),
                "Skipped top tracks without an id"
            );
        }
        debug!(time_range = window.time_range(), result_count = tracks.len(), "Found top tracks");

        Ok(tracks)
    }

    /// Get audio features for up to 100 tracks
    ///
    /// The result has one entry per requested id, in request order; `None`
    /// marks tracks Spotify has no features for.
    #[instrument(skip(self, session, track_ids), fields(count = track_ids.len()))]
    pub async fn get_audio_features(
        &self,
        session: &SpotifySession,
        track_ids: &[String],
    ) -> SpotifyResult<Vec<Option<AudioFeatures>>> {
        Self::validate_batch("track id", track_ids.len(), MAX_AUDIO_FEATURE_IDS)?;
        let ids = track_ids.join(",");

        let response: AudioFeaturesResponse = self
            .with_retry(|| async {
                let request = self
                    .request(Method::GET, "audio-features", session)?
                    .query(&[("ids", ids.as_str())]);
                self.send(request).await
            })
            .await?;

        let mut features = response.audio_features;
        if features.len() != track_ids.len() {
            warn!(
                requested = track_ids.len(),
                returned = features.len(),
                "Audio features response length mismatch"
            );
            features.resize(track_ids.len(), None);
        }

        Ok(features)
    }

    /// Get full artist records (including genres) for up to 50 artists
    ///
    /// Unknown ids are omitted from the result.
    #[instrument(skip(self, session, artist_ids), fields(count = artist_ids.len()))]
    pub async fn get_artists(
        &self,
        session: &SpotifySession,
        artist_ids: &[String],
    ) -> SpotifyResult<Vec<Artist>> {
        Self::validate_batch("artist id", artist_ids.len(), MAX_ARTIST_IDS)?;
        let ids = artist_ids.join(",");

        let response: ArtistsResponse = self
            .with_retry(|| async {
                let request = self
                    .request(Method::GET, "artists", session)?
                    .query(&[("ids", ids.as_str())]);
                self.send(request).await
            })
            .await?;

        Ok(response.artists.into_iter().flatten().map(Into::into).collect())
    }

    /// Create a playlist owned by `user_id`
    #[instrument(skip(self, session, playlist), fields(name = %playlist.name))]
    pub async fn create_playlist(
        &self,
        session: &SpotifySession,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> SpotifyResult<Playlist> {
        if user_id.trim().is_empty() {
            return Err(SpotifyError::InvalidInput(
                "user id cannot be empty".to_string(),
            ));
        }
        let path = format!("users/{}/playlists", user_id);

        // Not retried: a replayed create would duplicate the playlist
        let created: Playlist = self
            .send(self.request(Method::POST, &path, session)?.json(playlist))
            .await?;

        debug!(playlist_id = %created.id, "Created playlist");
        Ok(created)
    }

    /// Append up to 100 tracks to a playlist, returning the snapshot id
    #[instrument(skip(self, session, uris), fields(count = uris.len()))]
    pub async fn add_tracks_to_playlist(
        &self,
        session: &SpotifySession,
        playlist_id: &str,
        uris: &[String],
    ) -> SpotifyResult<String> {
        Self::validate_batch("track uri", uris.len(), MAX_PLAYLIST_URIS)?;
        let path = format!("playlists/{}/tracks", playlist_id);

        let response: SnapshotResponse = self
            .send(
                self.request(Method::POST, &path, session)?
                    .json(&TrackUrisRequest { uris }),
            )
            .await?;

        Ok(response.snapshot_id)
    }

    /// Replace a playlist's contents with up to 100 tracks
    ///
    /// An empty list clears the playlist.
    #[instrument(skip(self, session, uris), fields(count = uris.len()))]
    pub async fn replace_playlist_tracks(
        &self,
        session: &SpotifySession,
        playlist_id: &str,
        uris: &[String],
    ) -> SpotifyResult<String> {
        if uris.len() > MAX_PLAYLIST_URIS {
            return Err(SpotifyError::InvalidInput(format!(
                "too many track uris ({} > {})",
                uris.len(),
                MAX_PLAYLIST_URIS
            )));
        }
        let path = format!("playlists/{}/tracks", playlist_id);

        // Idempotent, so retried like the reads
        let response: SnapshotResponse = self
            .with_retry(|| async {
                let request = self
                    .request(Method::PUT, &path, session)?
                    .json(&TrackUrisRequest { uris });
                self.send(request).await
            })
            .await?;

        Ok(response.snapshot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use vibecheck_test_utils::{AudioFeaturesFixture, MockSpotifyServer, TrackFixture};

    fn test_client(server: &MockSpotifyServer) -> SpotifyClient {
        SpotifyClient::new(&SpotifyConfig::with_url(server.url()))
            .unwrap()
            .with_retry_config(0, 1)
    }

    fn session() -> SpotifySession {
        SpotifySession::new(MockSpotifyServer::ACCESS_TOKEN)
    }

    #[test]
    fn test_client_creation() {
        let client = SpotifyClient::new(&SpotifyConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_with_retry_configuration() {
        let client = SpotifyClient::new(&SpotifyConfig::default())
            .unwrap()
            .with_retry_config(5, 1000);
        assert_eq!(client.max_retries, 5);
        assert_eq!(client.retry_base_delay_ms, 1000);
    }

    #[test]
    fn test_validate_batch() {
        assert_matches!(
            SpotifyClient::validate_batch("track id", 0, 100),
            Err(SpotifyError::InvalidInput(_))
        );
        assert_matches!(
            SpotifyClient::validate_batch("track id", 101, 100),
            Err(SpotifyError::InvalidInput(_))
        );
        assert!(SpotifyClient::validate_batch("track id", 100, 100).is_ok());
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(SpotifyError::Timeout.is_retryable());
        assert!(SpotifyError::RateLimited {
            retry_after_secs: None
        }
        .is_retryable());
        assert!(SpotifyError::Api {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_retryable());
        assert!(!SpotifyError::Api {
            status: 404,
            message: "missing".to_string()
        }
        .is_retryable());
        assert!(!SpotifyError::Unauthorized("expired".to_string()).is_retryable());
        assert!(!SpotifyError::MissingAccessToken.is_retryable());
    }

    #[tokio::test]
    async fn test_get_top_tracks_skips_local_files() {
        let server = MockSpotifyServer::start().await;
        server
            .mock_top_tracks(
                TimeWindow::Recent,
                vec![
                    TrackFixture::new("t1").with_genres(&["pop"]),
                    TrackFixture::local_file("My Demo"),
                    TrackFixture::new("t2"),
                ],
            )
            .await;

        let tracks = test_client(&server)
            .get_top_tracks(&session(), TimeWindow::Recent, Some(20))
            .await
            .unwrap();

        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(tracks[0].uri, "spotify:track:t1");
        assert_eq!(tracks[0].artists[0].genres, vec!["pop".to_string()]);
    }

    #[tokio::test]
    async fn test_get_top_tracks_rejects_bad_limit() {
        let server = MockSpotifyServer::start().await;
        let result = test_client(&server)
            .get_top_tracks(&session(), TimeWindow::Medium, Some(51))
            .await;
        assert_matches!(result, Err(SpotifyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let server = MockSpotifyServer::start().await;
        server.mock_unauthorized().await;

        let client = SpotifyClient::new(&SpotifyConfig::with_url(server.url()))
            .unwrap()
            .with_retry_config(3, 1);
        let result = client.get_current_user(&session()).await;

        assert_matches!(result, Err(SpotifyError::Unauthorized(msg)) if msg == "The access token expired");
        assert_eq!(server.request_count("/me").await, 1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockSpotifyServer::start().await;
        server
            .mock_top_tracks_failure(TimeWindow::LongTerm, 503)
            .await;

        let client = SpotifyClient::new(&SpotifyConfig::with_url(server.url()))
            .unwrap()
            .with_retry_config(2, 1);
        let result = client
            .get_top_tracks(&session(), TimeWindow::LongTerm, None)
            .await;

        assert_matches!(result, Err(SpotifyError::Api { status: 503, .. }));
        assert_eq!(server.request_count("/me/top/tracks").await, 3);
    }

    #[tokio::test]
    async fn test_rate_limit_reports_retry_after() {
        let server = MockSpotifyServer::start().await;
        server.mock_rate_limited("/audio-features", 7).await;

        let result = test_client(&server)
            .get_audio_features(&session(), &["t1".to_string()])
            .await;

        assert_matches!(
            result,
            Err(SpotifyError::RateLimited {
                retry_after_secs: Some(7)
            })
        );
    }

    #[tokio::test]
    async fn test_long_retry_after_is_not_waited_out() {
        let server = MockSpotifyServer::start().await;
        server.mock_rate_limited("/audio-features", 3600).await;

        let client = SpotifyClient::new(&SpotifyConfig::with_url(server.url()))
            .unwrap()
            .with_retry_config(3, 1);
        let result = client
            .get_audio_features(&session(), &["t1".to_string()])
            .await;

        assert_matches!(
            result,
            Err(SpotifyError::RateLimited {
                retry_after_secs: Some(3600)
            })
        );
        assert_eq!(server.request_count("/audio-features").await, 1);
    }

    #[test]
    fn test_backoff_delay_saturates() {
        let client = SpotifyClient::new(&SpotifyConfig::default())
            .unwrap()
            .with_retry_config(100, 1000);
        assert_eq!(client.backoff_delay_ms(1), 2000);
        assert_eq!(client.backoff_delay_ms(3), 8000);
        assert_eq!(client.backoff_delay_ms(63), u64::MAX);
        assert_eq!(client.backoff_delay_ms(64), u64::MAX);
    }

    #[tokio::test]
    async fn test_get_audio_features_keeps_positions() {
        let server = MockSpotifyServer::start().await;
        server
            .mock_audio_features(vec![
                AudioFeaturesFixture::new("a").energy(0.9),
                AudioFeaturesFixture::new("c").energy(0.1),
            ])
            .await;

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let features = test_client(&server)
            .get_audio_features(&session(), &ids)
            .await
            .unwrap();

        assert_eq!(features.len(), 3);
        assert_eq!(features[0].map(|f| f.energy), Some(0.9));
        assert!(features[1].is_none());
        assert_eq!(features[2].map(|f| f.energy), Some(0.1));
    }

    #[tokio::test]
    async fn test_get_audio_features_rejects_oversized_batch() {
        let server = MockSpotifyServer::start().await;
        let ids: Vec<String> = (0..101).map(|i| i.to_string()).collect();

        let result = test_client(&server)
            .get_audio_features(&session(), &ids)
            .await;

        assert_matches!(result, Err(SpotifyError::InvalidInput(_)));
        assert_eq!(server.request_count("/audio-features").await, 0);
    }

    #[tokio::test]
    async fn test_get_artists_returns_genres() {
        let server = MockSpotifyServer::start().await;
        server
            .mock_artists(vec![("artist-1", vec!["shoegaze", "dream pop"])])
            .await;

        let artists = test_client(&server)
            .get_artists(&session(), &["artist-1".to_string(), "ghost".to_string()])
            .await
            .unwrap();

        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].id.as_deref(), Some("artist-1"));
        assert_eq!(artists[0].genres, vec!["shoegaze", "dream pop"]);
    }

    #[tokio::test]
    async fn test_create_playlist_and_add_tracks() {
        let server = MockSpotifyServer::start().await;
        server.mock_create_playlist("user-1", "pl-1").await;
        server.mock_add_tracks("pl-1").await;

        let client = test_client(&server);
        let playlist = client
            .create_playlist(
                &session(),
                "user-1",
                &NewPlaylist {
                    name: "Mix".to_string(),
                    description: "desc".to_string(),
                    public: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(playlist.id, "pl-1");

        let snapshot = client
            .add_tracks_to_playlist(&session(), &playlist.id, &["spotify:track:a".to_string()])
            .await
            .unwrap();
        assert_eq!(snapshot, "snapshot-pl-1");
    }

    #[tokio::test]
    async fn test_expired_session_makes_no_request() {
        let server = MockSpotifyServer::start().await;
        let expired = SpotifySession::with_expiry(MockSpotifyServer::ACCESS_TOKEN, -1);

        let result = test_client(&server).get_current_user(&expired).await;

        assert_matches!(result, Err(SpotifyError::SessionExpired));
        assert_eq!(server.request_count("/me").await, 0);
    }
}
