//! Tweet composition from forum topics.

pub mod builder;
pub mod mentions;

pub use builder::{build_tweet, Tweet, TweetSettings};
pub use mentions::{extract_mentions, Extracted};
