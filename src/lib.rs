//! Discourse Topic Tweetbot library.
//!
//! A service that polls a Discourse forum for newly created topics and
//! republishes each one as a Twitter/X status, optionally with the topic's
//! thumbnail attached.

pub mod config;
pub mod constants;
pub mod discourse;
pub mod publisher;
pub mod tweet;
pub mod twitter;
