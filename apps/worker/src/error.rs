//! Error handling for the Vibecheck worker
//!
//! Degraded data (a failed window, missing audio features, failed genre
//! lookups) is absorbed inside the jobs. The variants here cover what still
//! stops a cycle: configuration problems and Spotify calls without a fallback.

use thiserror::Error;
use vibecheck_shared_config::ConfigError;
use vibecheck_spotify_client::SpotifyError;

/// Main worker error type
#[derive(Error, Debug)]
pub enum WorkerError {
    // ========== Job Errors ==========
    /// Job input could not be used
    #[error("invalid job data: {0}")]
    InvalidJobData(String),

    // ========== Spotify Errors ==========
    /// Spotify call failed and the job has no fallback for it
    #[error("Spotify request failed: {0}")]
    Spotify(#[from] SpotifyError),

    // ========== Output Errors ==========
    /// Summary could not be serialized
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    // ========== Configuration Errors ==========
    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl WorkerError {
    /// Check if running the cycle again may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Spotify(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// True when the user has to authorize again
    pub fn requires_reauthorization(&self) -> bool {
        matches!(
            self,
            Self::Spotify(
                SpotifyError::Unauthorized(_)
                    | SpotifyError::SessionExpired
                    | SpotifyError::MissingAccessToken
            )
        )
    }

    /// Get a severity level for logging
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration(_) => ErrorSeverity::Critical,
            Self::Spotify(_) if self.is_retryable() => ErrorSeverity::Warning,
            Self::Spotify(_) | Self::Serialization(_) => ErrorSeverity::Error,
            Self::InvalidJobData(_) => ErrorSeverity::Info,
        }
    }

    /// Log the error with appropriate severity
    pub fn log(&self) {
        match self.severity() {
            ErrorSeverity::Critical => {
                tracing::error!(
                    error = %self,
                    retryable = self.is_retryable(),
                    "Critical worker error"
                );
            }
            ErrorSeverity::Error => {
                tracing::error!(
                    error = %self,
                    retryable = self.is_retryable(),
                    reauthorize = self.requires_reauthorization(),
                    "Worker error"
                );
            }
            ErrorSeverity::Warning => {
                tracing::warn!(
                    error = %self,
                    retryable = self.is_retryable(),
                    "Worker warning"
                );
            }
            ErrorSeverity::Info => {
                tracing::info!(error = %self, "Worker info");
            }
        }
    }
}

/// Error severity levels for logging and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical errors that should trigger alerts
    Critical,
    /// Standard errors
    Error,
    /// Warnings for transient failures
    Warning,
    /// Informational messages
    Info,
}

/// Result type alias for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

// ========== Conversion Implementations ==========

impl From<ConfigError> for WorkerError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingEnvVar(name) => {
                Self::Configuration(format!("missing environment variable {}", name))
            }
            other => Self::Configuration(other.to_string()),
        }
    }
}
