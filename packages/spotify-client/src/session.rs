//! Explicit user session passed into every API call

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::error::{SpotifyError, SpotifyResult};

/// Bearer credentials for one user
///
/// Obtaining and refreshing the token belongs to the authorization flow; the
/// client only reads it.
#[derive(Clone)]
pub struct SpotifySession {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for SpotifySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifySession")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl SpotifySession {
    /// Session without known expiry
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// Session expiring `expires_in_secs` seconds from now
    pub fn with_expiry(access_token: impl Into<String>, expires_in_secs: i64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Some(Utc::now() + Duration::seconds(expires_in_secs)),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// True once the expiry time has passed (never, when unknown)
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    /// Token to send, validated for presence and expiry
    pub(crate) fn bearer_token(&self) -> SpotifyResult<&str> {
        if self.access_token.trim().is_empty() {
            return Err(SpotifyError::MissingAccessToken);
        }
        if self.is_expired() {
            return Err(SpotifyError::SessionExpired);
        }
        Ok(&self.access_token)
    }
}
