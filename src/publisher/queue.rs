//! In-memory backlog of topics waiting to be published.

use tracing::{debug, info};

use crate::discourse::{DiscourseError, ForumApi, Topic};

/// Ordered backlog of unpublished topics plus the newest-seen watermark.
///
/// Entries are kept sorted newest-first. The watermark only ever moves up.
#[derive(Debug, Clone, Default)]
pub struct TopicQueue {
    entries: Vec<Topic>,
    watermark: Option<u64>,
}

impl TopicQueue {
    /// Create an empty queue. With no watermark, the first merge seeds it
    /// from the newest topic seen without queueing anything.
    #[must_use]
    pub fn new(watermark: Option<u64>) -> Self {
        Self {
            entries: Vec::new(),
            watermark,
        }
    }

    #[must_use]
    pub fn watermark(&self) -> Option<u64> {
        self.watermark
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued topic ids, newest first.
    #[must_use]
    pub fn ids(&self) -> Vec<u64> {
        self.entries.iter().map(|t| t.id).collect()
    }

    /// Add topics newer than the watermark that are not already queued.
    ///
    /// Returns the number of entries added.
    pub fn merge(&mut self, topics: Vec<Topic>) -> usize {
        let Some(watermark) = self.watermark else {
            self.watermark = topics.iter().map(|t| t.id).max();
            if let Some(seed) = self.watermark {
                info!(watermark = seed, "Seeded watermark from latest topics");
            }
            return 0;
        };

        let mut added = 0;
        for topic in topics {
            if topic.id <= watermark || self.entries.iter().any(|t| t.id == topic.id) {
                continue;
            }
            debug!(topic_id = topic.id, title = %topic.title, "Queued topic");
            self.entries.push(topic);
            added += 1;
        }

        if added > 0 {
            self.entries.sort_by(|a, b| b.id.cmp(&a.id));
            if let Some(newest) = self.entries.first() {
                self.watermark = Some(watermark.max(newest.id));
            }
        }
        added
    }

    /// Remove and return the newest queued topic.
    pub fn pop_newest(&mut self) -> Option<Topic> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Put a topic back after a transient failure. The watermark is not
    /// consulted since the topic was already admitted once.
    pub fn requeue(&mut self, topic: Topic) {
        if self.entries.iter().any(|t| t.id == topic.id) {
            return;
        }
        self.entries.push(topic);
        self.entries.sort_by(|a, b| b.id.cmp(&a.id));
    }

    /// Record a published topic id.
    pub fn mark_published(&mut self, id: u64) {
        self.watermark = Some(self.watermark.map_or(id, |w| w.max(id)));
    }
}

/// Fetch the latest topics and merge them into the queue.
///
/// An empty listing is a no-op. On a failed fetch the queue is left untouched
/// and the error is returned so the caller can retry on its next tick.
///
/// # Errors
///
/// Returns an error if the latest topics cannot be fetched.
pub async fn refresh<F: ForumApi + ?Sized>(
    forum: &F,
    queue: &mut TopicQueue,
) -> Result<usize, DiscourseError> {
    let topics = forum.latest_topics().await?;
    let added = queue.merge(topics);
    if added > 0 {
        info!(
            new_topics = added,
            queued = queue.len(),
            watermark = queue.watermark(),
            "Refreshed topic queue"
        );
    } else {
        debug!(queued = queue.len(), "No new topics");
    }
    Ok(added)
}
