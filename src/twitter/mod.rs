//! Twitter/X status posting.

mod client;
pub mod oauth;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub use client::TwitterClient;
pub use oauth::OAuthCredentials;

#[derive(Debug, Error)]
pub enum TwitterError {
    #[error("Twitter request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Twitter returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to read media file {}: {source}", path.display())]
    Media {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A status accepted by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedStatus {
    pub id: String,
}

/// Posting operations the bot depends on.
#[async_trait]
pub trait StatusPoster: Send + Sync {
    /// Post a text-only status.
    async fn post_status(&self, text: &str) -> Result<PostedStatus, TwitterError>;

    /// Upload a local media file and post a status with it attached.
    async fn post_status_with_media(
        &self,
        text: &str,
        media: &Path,
    ) -> Result<PostedStatus, TwitterError>;
}
