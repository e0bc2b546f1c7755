//! Audio-feature source backed by the Spotify API

use async_trait::async_trait;
use vibecheck_engine::{AudioFeatureSource, AudioFeatures};

use crate::client::SpotifyClient;
use crate::error::SpotifyError;
use crate::session::SpotifySession;

/// A client bound to one user's session
///
/// Feeds [`vibecheck_engine::VibeProfileBuilder`] with features fetched
/// on behalf of that user.
#[derive(Debug, Clone, Copy)]
pub struct SessionFeatureSource<'a> {
    client: &'a SpotifyClient,
    session: &'a SpotifySession,
}

impl SpotifyClient {
    /// Bind this client to `session` as an audio-feature source
    pub fn feature_source<'a>(&'a self, session: &'a SpotifySession) -> SessionFeatureSource<'a> {
        SessionFeatureSource {
            client: self,
            session,
        }
    }
}

#[async_trait]
impl AudioFeatureSource for SessionFeatureSource<'_> {
    type Error = SpotifyError;

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, Self::Error> {
        self.client.get_audio_features(self.session, track_ids).await
    }
}
