//! Topic queueing and publishing.
//!
//! A [`Publisher`] owns the forum and posting clients together with the
//! [`TopicQueue`]. Each cycle it refreshes the queue when due, then takes the
//! newest entry, refetches its detail, builds the tweet and posts it. Delivery
//! is at-most-once: a failed entry is logged and dropped.

pub mod interactive;
pub mod poller;
pub mod queue;

pub use interactive::{review, KeySource, ReviewDecision, ReviewSummary, TerminalKeys};
pub use poller::{next_sleep, CycleReport, PublishOutcome, PublishSettings, Publisher};
pub use queue::{refresh, TopicQueue};
