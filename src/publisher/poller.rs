//! The poll-and-publish loop.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::queue::{self, TopicQueue};
use crate::config::Config;
use crate::discourse::{DiscourseError, ForumApi, Topic};
use crate::tweet::{build_tweet, Tweet, TweetSettings};
use crate::twitter::StatusPoster;

/// Scheduling and composition settings for the publisher.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub poll_interval: Duration,
    pub refresh_interval: Duration,
    pub tweet: TweetSettings,
}

impl PublishSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval,
            refresh_interval: config.topic_refresh_interval,
            tweet: TweetSettings::from_config(config),
        }
    }
}

/// What happened to a dequeued topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Posted { topic_id: u64, status_id: String },
    /// The topic no longer exists on the forum; the entry was dropped.
    FetchFailed { topic_id: u64 },
    /// The topic detail could not be refetched right now; the entry stays
    /// queued for the next tick.
    FetchDeferred { topic_id: u64 },
    /// The platform rejected the post; the entry was dropped.
    PostFailed { topic_id: u64 },
}

/// Summary of one loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// A refresh was attempted and succeeded.
    pub refreshed: bool,
    pub new_topics: usize,
    pub refresh_elapsed: Duration,
    pub outcome: Option<PublishOutcome>,
}

/// Owns the clients and the topic queue for the lifetime of the process.
pub struct Publisher<F, P> {
    forum: F,
    poster: P,
    settings: PublishSettings,
    queue: TopicQueue,
    last_refresh: Option<Instant>,
}

impl<F: ForumApi, P: StatusPoster> Publisher<F, P> {
    #[must_use]
    pub fn new(forum: F, poster: P, settings: PublishSettings, queue: TopicQueue) -> Self {
        Self {
            forum,
            poster,
            settings,
            queue,
            last_refresh: None,
        }
    }

    #[must_use]
    pub fn queue(&self) -> &TopicQueue {
        &self.queue
    }

    /// Remove and return the newest queued topic.
    pub fn dequeue(&mut self) -> Option<Topic> {
        self.queue.pop_newest()
    }

    fn refresh_due(&self) -> bool {
        self.last_refresh
            .map_or(true, |at| at.elapsed() >= self.settings.refresh_interval)
    }

    /// Refresh the queue from the forum's latest topics.
    ///
    /// Only a successful refresh resets the refresh timer, so a failed one is
    /// retried on the next cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the latest topics cannot be fetched.
    pub async fn refresh(&mut self) -> Result<usize, DiscourseError> {
        let started = Instant::now();
        let added = queue::refresh(&self.forum, &mut self.queue).await?;
        self.last_refresh = Some(started);
        Ok(added)
    }

    /// Run one iteration: refresh if due, then publish at most one topic.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let (refreshed, new_topics, refresh_elapsed) = if self.refresh_due() {
            let started = Instant::now();
            match self.refresh().await {
                Ok(added) => (true, added, started.elapsed()),
                Err(e) => {
                    warn!("Failed to fetch latest topics: {e:#}");
                    (false, 0, started.elapsed())
                }
            }
        } else {
            (false, 0, Duration::ZERO)
        };

        let outcome = self.publish_next().await;

        CycleReport {
            refreshed,
            new_topics,
            refresh_elapsed,
            outcome,
        }
    }

    /// Dequeue the newest topic, refetch it, and post it.
    ///
    /// Returns `None` when the queue is empty. A topic that vanished from the
    /// forum or whose post was rejected is dropped; a topic whose refetch
    /// failed for any other reason goes back on the queue.
    pub async fn publish_next(&mut self) -> Option<PublishOutcome> {
        let topic = self.queue.pop_newest()?;

        let tweet = match self.prepare(&topic).await {
            Ok(tweet) => tweet,
            Err(DiscourseError::NotFound(id)) => {
                warn!(topic_id = id, title = %topic.title, "Topic vanished, dropping it");
                return Some(PublishOutcome::FetchFailed { topic_id: id });
            }
            Err(e) => {
                warn!(
                    topic_id = topic.id,
                    title = %topic.title,
                    "Failed to fetch topic, retrying next tick: {e:#}"
                );
                let topic_id = topic.id;
                self.queue.requeue(topic);
                return Some(PublishOutcome::FetchDeferred { topic_id });
            }
        };

        Some(self.publish(&topic, &tweet).await)
    }

    /// Refetch a topic's full detail and compose its tweet.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic cannot be fetched.
    pub async fn prepare(&self, topic: &Topic) -> Result<Tweet, DiscourseError> {
        let detail = self
            .forum
            .get_topic(topic.id)
            .await?
            .with_listing_excerpt(topic);
        Ok(build_tweet(&detail, &self.settings.tweet))
    }

    /// Post a composed tweet for a topic. Failures are logged, never retried.
    pub async fn publish(&mut self, topic: &Topic, tweet: &Tweet) -> PublishOutcome {
        info!(topic_id = topic.id, title = %topic.title, "Tweet topic");

        let result = match &tweet.thumbnail {
            Some(path) => {
                info!(thumbnail = %path.display(), "Attaching thumbnail");
                self.poster.post_status_with_media(&tweet.text, path).await
            }
            None => self.poster.post_status(&tweet.text).await,
        };

        match result {
            Ok(status) => {
                self.queue.mark_published(topic.id);
                info!(
                    topic_id = topic.id,
                    title = %topic.title,
                    status_id = %status.id,
                    remaining = self.queue.len(),
                    "Tweeted topic"
                );
                PublishOutcome::Posted {
                    topic_id: topic.id,
                    status_id: status.id,
                }
            }
            Err(e) => {
                error!(
                    topic_id = topic.id,
                    title = %topic.title,
                    error = %e,
                    "TWEET FAILED"
                );
                PublishOutcome::PostFailed { topic_id: topic.id }
            }
        }
    }

    /// Poll and publish until the process is stopped.
    pub async fn run_forever(&mut self) {
        info!(
            poll_secs = self.settings.poll_interval.as_secs(),
            refresh_secs = self.settings.refresh_interval.as_secs(),
            watermark = self.queue.watermark(),
            "Publish loop started"
        );

        loop {
            let report = self.run_cycle().await;
            if report.outcome.is_none() {
                debug!("Nothing to tweet");
            }

            let sleep = next_sleep(
                self.settings.poll_interval,
                self.settings.refresh_interval,
                report.refresh_elapsed,
            );
            debug!(secs = sleep.as_secs(), queued = self.queue.len(), "Sleeping");
            tokio::time::sleep(sleep).await;
        }
    }
}

/// Delay before the next cycle.
///
/// Time spent refreshing counts against the polling interval, but the delay
/// never drops below the shorter of the two configured intervals.
#[must_use]
pub fn next_sleep(poll: Duration, refresh: Duration, refresh_elapsed: Duration) -> Duration {
    poll.min(refresh).max(poll.saturating_sub(refresh_elapsed))
}
