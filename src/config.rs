use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{DEFAULT_SHARED_PATH, TWITTER_API_URL, TWITTER_UPLOAD_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Discourse
    pub discourse_host: String,
    pub discourse_api_user: String,
    pub discourse_api_key: String,
    pub discourse_shared_path: PathBuf,
    /// Starting watermark. `None` means "seed from the first refresh".
    pub newest_topic_id: Option<u64>,

    // Twitter
    pub twitter_api_key: String,
    pub twitter_api_secret: String,
    pub twitter_access_token: String,
    pub twitter_access_token_secret: String,
    pub twitter_api_url: String,
    pub twitter_upload_url: String,

    // Scheduling
    pub poll_interval: Duration,
    pub topic_refresh_interval: Duration,
    pub http_timeout: Duration,

    // Tweet composition
    pub use_thumbnails: bool,
    pub tweet_prepend: String,
    pub tweet_mentions: String,
    pub tweet_hashtags: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let poll_minutes = parse_env_u64("POLLING_INTERVAL", 10)?;
        let refresh_minutes = parse_env_u64("TOPIC_REFRESH_INTERVAL", poll_minutes)?;

        Ok(Self {
            // Discourse
            discourse_host: required_env("DISCOURSE_HOST")?,
            discourse_api_user: required_env("DISCOURSE_API_USER")?,
            discourse_api_key: required_env("DISCOURSE_API_KEY")?,
            discourse_shared_path: PathBuf::from(env_or_default(
                "DISCOURSE_SHARED_PATH",
                DEFAULT_SHARED_PATH,
            )),
            newest_topic_id: parse_env_optional_u64("DISCOURSE_NEWEST_TOPIC_ID")?,

            // Twitter
            twitter_api_key: required_env("TWITTER_API_KEY")?,
            twitter_api_secret: required_env("TWITTER_API_SECRET_KEY")?,
            twitter_access_token: required_env("TWITTER_ACCESS_TOKEN")?,
            twitter_access_token_secret: required_env("TWITTER_ACCESS_TOKEN_SECRET")?,
            twitter_api_url: env_or_default("TWITTER_API_URL", TWITTER_API_URL),
            twitter_upload_url: env_or_default("TWITTER_UPLOAD_URL", TWITTER_UPLOAD_URL),

            // Scheduling
            poll_interval: Duration::from_secs(poll_minutes.saturating_mul(60)),
            topic_refresh_interval: Duration::from_secs(refresh_minutes.saturating_mul(60)),
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // Tweet composition
            use_thumbnails: parse_env_bool("TWEET_USE_THUMBNAILS", true)?,
            tweet_prepend: raw_env_or_empty("TWEET_STRING"),
            tweet_mentions: raw_env_or_empty("TWEET_MENTIONS"),
            tweet_hashtags: raw_env_or_empty("TWEET_HASHTAGS"),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.discourse_host) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    name: "DISCOURSE_HOST".to_string(),
                    message: format!("must be an http(s) URL, got '{}'", self.discourse_host),
                });
            }
        }
        for (name, value) in [
            ("DISCOURSE_API_USER", &self.discourse_api_user),
            ("DISCOURSE_API_KEY", &self.discourse_api_key),
            ("TWITTER_API_KEY", &self.twitter_api_key),
            ("TWITTER_API_SECRET_KEY", &self.twitter_api_secret),
            ("TWITTER_ACCESS_TOKEN", &self.twitter_access_token),
            ("TWITTER_ACCESS_TOKEN_SECRET", &self.twitter_access_token_secret),
        ] {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: "cannot be empty".to_string(),
                });
            }
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "POLLING_INTERVAL".to_string(),
                message: "must be at least 1 minute".to_string(),
            });
        }
        if self.topic_refresh_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "TOPIC_REFRESH_INTERVAL".to_string(),
                message: "must be at least 1 minute".to_string(),
            });
        }
        Ok(())
    }

    /// Forum base URL without a trailing slash.
    #[must_use]
    pub fn forum_base_url(&self) -> &str {
        self.discourse_host.trim_end_matches('/')
    }

    /// Configuration with placeholder credentials, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            discourse_host: "https://forum.example.com".to_string(),
            discourse_api_user: "system".to_string(),
            discourse_api_key: "test-discourse-key".to_string(),
            discourse_shared_path: PathBuf::from(DEFAULT_SHARED_PATH),
            newest_topic_id: None,
            twitter_api_key: "test-consumer-key".to_string(),
            twitter_api_secret: "test-consumer-secret".to_string(),
            twitter_access_token: "test-access-token".to_string(),
            twitter_access_token_secret: "test-access-secret".to_string(),
            twitter_api_url: TWITTER_API_URL.to_string(),
            twitter_upload_url: TWITTER_UPLOAD_URL.to_string(),
            poll_interval: Duration::from_secs(600),
            topic_refresh_interval: Duration::from_secs(600),
            http_timeout: Duration::from_secs(10),
            use_thumbnails: true,
            tweet_prepend: String::new(),
            tweet_mentions: String::new(),
            tweet_hashtags: String::new(),
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

// Tweet fragments keep their surrounding whitespace.
fn raw_env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    Ok(parse_env_optional_u64(name)?.unwrap_or(default))
}

fn parse_env_optional_u64(name: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.trim().is_empty() => {
            val.trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::ParseInt {
                    name: name.to_string(),
                    source: e,
                })
        }
        _ => Ok(None),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => parse_bool(name, &val),
        _ => Ok(default),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ParseBool {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
