//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use tracing_subscriber::fmt::MakeWriter;

use discourse_topic_tweetbot::config::Config;
use discourse_topic_tweetbot::discourse::{DiscourseError, ForumApi, Topic, TopicDetail};
use discourse_topic_tweetbot::publisher::{KeySource, PublishSettings};
use discourse_topic_tweetbot::tweet::TweetSettings;
use discourse_topic_tweetbot::twitter::{PostedStatus, StatusPoster, TwitterError};

pub const FORUM: &str = "https://forum.example.com";

pub fn topic(id: u64) -> Topic {
    Topic {
        id,
        title: format!("Topic {id}"),
        slug: format!("topic-{id}"),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        image_url: None,
        excerpt: None,
    }
}

pub fn detail(topic: Topic) -> TopicDetail {
    TopicDetail {
        body_html: Some(format!(
            "<p>With <a>@author{}</a> <a>#topic{}</a></p>",
            topic.id, topic.id
        )),
        topic,
    }
}

pub fn settings() -> PublishSettings {
    PublishSettings {
        poll_interval: Duration::from_secs(600),
        refresh_interval: Duration::from_secs(600),
        tweet: TweetSettings::from_config(&Config::for_testing()),
    }
}

#[derive(Default)]
struct ForumState {
    latest: Vec<Topic>,
    details: HashMap<u64, TopicDetail>,
    fail_latest: bool,
    failing_topics: HashSet<u64>,
    fetched: Vec<u64>,
}

/// In-memory forum. Clones share state.
#[derive(Clone, Default)]
pub struct FakeForum {
    state: Arc<Mutex<ForumState>>,
}

impl FakeForum {
    /// Forum listing `topics`, each with a refetchable detail.
    pub fn with_topics(topics: Vec<Topic>) -> Self {
        let forum = Self::default();
        for t in &topics {
            forum.add_detail(detail(t.clone()));
        }
        forum.set_latest(topics);
        forum
    }

    pub fn set_latest(&self, topics: Vec<Topic>) {
        self.state.lock().unwrap().latest = topics;
    }

    pub fn add_detail(&self, detail: TopicDetail) {
        self.state
            .lock()
            .unwrap()
            .details
            .insert(detail.topic.id, detail);
    }

    pub fn remove_detail(&self, id: u64) {
        self.state.lock().unwrap().details.remove(&id);
    }

    pub fn fail_latest(&self, fail: bool) {
        self.state.lock().unwrap().fail_latest = fail;
    }

    /// Make refetches of `id` fail with a server error until cleared.
    pub fn fail_topic(&self, id: u64, fail: bool) {
        let mut state = self.state.lock().unwrap();
        if fail {
            state.failing_topics.insert(id);
        } else {
            state.failing_topics.remove(&id);
        }
    }

    pub fn fetched(&self) -> Vec<u64> {
        self.state.lock().unwrap().fetched.clone()
    }
}

#[async_trait]
impl ForumApi for FakeForum {
    async fn latest_topics(&self) -> Result<Vec<Topic>, DiscourseError> {
        let state = self.state.lock().unwrap();
        if state.fail_latest {
            return Err(DiscourseError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "maintenance".to_string(),
            });
        }
        Ok(state.latest.clone())
    }

    async fn get_topic(&self, id: u64) -> Result<TopicDetail, DiscourseError> {
        let mut state = self.state.lock().unwrap();
        state.fetched.push(id);
        if state.failing_topics.contains(&id) {
            return Err(DiscourseError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: "upstream timed out".to_string(),
            });
        }
        state
            .details
            .get(&id)
            .cloned()
            .ok_or(DiscourseError::NotFound(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentStatus {
    pub text: String,
    pub media: Option<PathBuf>,
}

#[derive(Default)]
struct PosterState {
    sent: Vec<SentStatus>,
    reject: bool,
}

/// Records posted statuses instead of sending them. Clones share state.
#[derive(Clone, Default)]
pub struct FakePoster {
    state: Arc<Mutex<PosterState>>,
}

impl FakePoster {
    pub fn reject(&self, reject: bool) {
        self.state.lock().unwrap().reject = reject;
    }

    pub fn sent(&self) -> Vec<SentStatus> {
        self.state.lock().unwrap().sent.clone()
    }

    fn record(&self, text: &str, media: Option<&Path>) -> Result<PostedStatus, TwitterError> {
        let mut state = self.state.lock().unwrap();
        if state.reject {
            return Err(TwitterError::Status {
                status: StatusCode::FORBIDDEN,
                body: "Status is a duplicate.".to_string(),
            });
        }
        state.sent.push(SentStatus {
            text: text.to_string(),
            media: media.map(Path::to_path_buf),
        });
        Ok(PostedStatus {
            id: format!("status-{}", state.sent.len()),
        })
    }
}

#[async_trait]
impl StatusPoster for FakePoster {
    async fn post_status(&self, text: &str) -> Result<PostedStatus, TwitterError> {
        self.record(text, None)
    }

    async fn post_status_with_media(
        &self,
        text: &str,
        media: &Path,
    ) -> Result<PostedStatus, TwitterError> {
        self.record(text, Some(media))
    }
}

/// Keystrokes replayed from a fixed script.
pub struct ScriptedKeys(pub VecDeque<char>);

impl ScriptedKeys {
    pub fn new(keys: &str) -> Self {
        Self(keys.chars().collect())
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> std::io::Result<char> {
        self.0
            .pop_front()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "no more keys"))
    }
}

/// Captures formatted log output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
