//! Manual review mode: preview each queued tweet and confirm before posting.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::poller::{PublishOutcome, Publisher};
use crate::discourse::ForumApi;
use crate::twitter::StatusPoster;

/// Source of single operator keystrokes.
pub trait KeySource {
    /// Block until one key is pressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn read_key(&mut self) -> std::io::Result<char>;
}

/// Reads unbuffered keystrokes from the controlling terminal.
pub struct TerminalKeys {
    term: console::Term,
}

impl TerminalKeys {
    #[must_use]
    pub fn new() -> Self {
        Self {
            term: console::Term::stderr(),
        }
    }
}

impl Default for TerminalKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for TerminalKeys {
    fn read_key(&mut self) -> std::io::Result<char> {
        self.term.read_char()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Post,
    Skip,
    Quit,
}

impl ReviewDecision {
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'y' => Some(Self::Post),
            'n' => Some(Self::Skip),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub posted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub quit: bool,
}

/// Refresh once, then walk the queue newest-first asking the operator
/// whether to post each tweet. Nothing is posted without a `y`.
///
/// # Errors
///
/// Returns an error if the latest topics cannot be fetched, the preview
/// cannot be written, or a key cannot be read.
pub async fn review<F, P, K, W>(
    publisher: &mut Publisher<F, P>,
    keys: &mut K,
    out: &mut W,
) -> Result<ReviewSummary>
where
    F: ForumApi,
    P: StatusPoster,
    K: KeySource + ?Sized,
    W: Write + ?Sized,
{
    let mut summary = ReviewSummary::default();
    publisher
        .refresh()
        .await
        .context("Failed to fetch latest topics")?;
    info!(queued = publisher.queue().len(), "Interactive review");

    while let Some(topic) = publisher.dequeue() {
        let tweet = match publisher.prepare(&topic).await {
            Ok(tweet) => tweet,
            Err(e) => {
                warn!(topic_id = topic.id, "Skipping topic: {e:#}");
                summary.skipped += 1;
                continue;
            }
        };

        writeln!(out, "\nNext tweet from Discourse topic {}:\n{}", topic.id, tweet.text)?;
        if let Some(path) = &tweet.thumbnail {
            writeln!(out, "thumbnail: {}", path.display())?;
        }

        let decision = loop {
            write!(out, "Post this tweet? [y]es / [n]o / [q]uit: ")?;
            out.flush()?;
            let key = keys.read_key().context("Failed to read key")?;
            writeln!(out)?;
            if let Some(decision) = ReviewDecision::from_key(key) {
                break decision;
            }
        };

        match decision {
            ReviewDecision::Post => match publisher.publish(&topic, &tweet).await {
                PublishOutcome::Posted { .. } => summary.posted += 1,
                _ => summary.failed += 1,
            },
            ReviewDecision::Skip => summary.skipped += 1,
            ReviewDecision::Quit => {
                summary.quit = true;
                break;
            }
        }
    }

    Ok(summary)
}
