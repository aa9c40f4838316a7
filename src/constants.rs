//! Shared constants used across the application.

/// User agent string sent with every outbound request.
pub const USER_AGENT: &str = concat!("discourse-topic-tweetbot/", env!("CARGO_PKG_VERSION"));

/// Default location of the Discourse shared volume on a standard install.
pub const DEFAULT_SHARED_PATH: &str = "/var/discourse/shared/standalone";

/// Twitter REST API base URL.
pub const TWITTER_API_URL: &str = "https://api.twitter.com";

/// Twitter media upload base URL.
pub const TWITTER_UPLOAD_URL: &str = "https://upload.twitter.com";
