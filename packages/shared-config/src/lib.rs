//! Shared configuration types for Vibecheck services
//!
//! This crate provides the configuration read by both the Spotify client and
//! the worker, loaded from environment variables.

mod error;
mod spotify;

pub use error::{ConfigError, ConfigResult};
pub use spotify::{
    SpotifyConfig, DEFAULT_SPOTIFY_API_URL, MAX_RETRIES_LIMIT, MAX_TOP_TRACKS_LIMIT,
    MIN_TOP_TRACKS_LIMIT,
};

use std::env;

use serde::{Deserialize, Serialize};

/// Common configuration shared between all services
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Spotify Web API configuration
    pub spotify: SpotifyConfig,

    /// Environment mode (development, staging, production)
    pub environment: Environment,

    /// Tracing filter directive (from RUST_LOG or LOG_LEVEL)
    pub log_level: String,
}

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        })
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl CommonConfig {
    /// Load common configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            spotify: SpotifyConfig::from_env()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse()
                .unwrap_or_default(),
            log_level: env::var("RUST_LOG")
                .or_else(|_| env::var("LOG_LEVEL"))
                .unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Helper function to get a required environment variable
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "stage".parse::<Environment>().unwrap(),
            Environment::Staging
        );
        assert_eq!(
            "anything".parse::<Environment>().unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(format!("{}", Environment::Production), "production");
        assert_eq!(format!("{}", Environment::Staging), "staging");
        assert_eq!(format!("{}", Environment::Development), "development");
    }

    #[test]
    fn test_required_env_rejects_blank() {
        temp_env::with_var("VIBECHECK_TEST_BLANK", Some("  "), || {
            assert!(matches!(
                get_required_env("VIBECHECK_TEST_BLANK"),
                Err(ConfigError::MissingEnvVar(_))
            ));
        });
        temp_env::with_var_unset("VIBECHECK_TEST_MISSING", || {
            assert!(get_required_env("VIBECHECK_TEST_MISSING").is_err());
        });
    }

    #[test]
    fn test_common_config_from_env() {
        temp_env::with_vars(
            vec![
                ("ENVIRONMENT", Some("prod")),
                ("RUST_LOG", None),
                ("LOG_LEVEL", Some("warn")),
            ],
            || {
                let config = CommonConfig::from_env().unwrap();
                assert_eq!(config.environment, Environment::Production);
                assert_eq!(config.log_level, "warn");
            },
        );
    }
}
