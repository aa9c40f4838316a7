//! Read-only Discourse API access.
//!
//! The bot only needs two calls: the "latest topics" listing and a topic's
//! full detail. Both go through [`ForumApi`] so the publish loop can run
//! against an in-memory forum in tests.

mod client;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

pub use client::DiscourseClient;
pub use models::{Topic, TopicDetail};

#[derive(Debug, Error)]
pub enum DiscourseError {
    #[error("Discourse request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Discourse returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("topic {0} not found")]
    NotFound(u64),
}

/// Forum operations the bot depends on.
#[async_trait]
pub trait ForumApi: Send + Sync {
    /// Fetch the forum's current "latest topics" page.
    async fn latest_topics(&self) -> Result<Vec<Topic>, DiscourseError>;

    /// Fetch a single topic with its first post.
    async fn get_topic(&self, id: u64) -> Result<TopicDetail, DiscourseError>;
}
