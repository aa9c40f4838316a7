use std::path::{Path, PathBuf};

use url::Url;

use super::mentions::extract_mentions;
use crate::config::Config;
use crate::discourse::TopicDetail;

/// Fixed inputs to tweet composition.
#[derive(Debug, Clone)]
pub struct TweetSettings {
    /// Forum base URL without a trailing slash.
    pub base_url: String,
    pub prepend: String,
    pub mentions_seed: String,
    pub hashtags_seed: String,
    pub use_thumbnails: bool,
    /// Local directory that mirrors the forum's public upload paths.
    pub shared_path: PathBuf,
}

impl TweetSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.forum_base_url().to_string(),
            prepend: config.tweet_prepend.clone(),
            mentions_seed: config.tweet_mentions.clone(),
            hashtags_seed: config.tweet_hashtags.clone(),
            use_thumbnails: config.use_thumbnails,
            shared_path: config.discourse_shared_path.clone(),
        }
    }
}

/// A composed status ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweet {
    pub text: String,
    pub thumbnail: Option<PathBuf>,
}

/// Compose the status text for a topic.
///
/// Layout: prepend, hashtags, title, mentions, then the canonical
/// `{base}/t/{slug}/{id}` link, one section per line.
#[must_use]
pub fn build_tweet(detail: &TopicDetail, settings: &TweetSettings) -> Tweet {
    let topic = &detail.topic;
    let extracted = extract_mentions(
        detail.body().unwrap_or_default(),
        &settings.mentions_seed,
        &settings.hashtags_seed,
    );

    let mut text = settings.prepend.clone();
    text.push_str(&extracted.hashtags);
    text.push('\n');
    text.push_str(&topic.title);
    text.push('\n');
    text.push_str(&extracted.mentions);
    text.push('\n');
    text.push_str(&topic_url(&settings.base_url, &topic.slug, topic.id));

    let thumbnail = if settings.use_thumbnails {
        topic
            .image_url
            .as_deref()
            .and_then(|url| thumbnail_path(url, &settings.base_url, &settings.shared_path))
    } else {
        None
    };

    Tweet { text, thumbnail }
}

/// Canonical public URL of a topic.
#[must_use]
pub fn topic_url(base_url: &str, slug: &str, id: u64) -> String {
    format!("{}/t/{slug}/{id}", base_url.trim_end_matches('/'))
}

/// Map a public upload URL on the forum host onto the shared local volume.
///
/// Query string and fragment are dropped and percent-escapes decoded. Returns
/// `None` for images served from any other origin or outside the forum path.
#[must_use]
pub fn thumbnail_path(image_url: &str, base_url: &str, shared_path: &Path) -> Option<PathBuf> {
    let image = Url::parse(image_url).ok()?;
    let base = Url::parse(base_url).ok()?;
    if image.origin() != base.origin() {
        return None;
    }

    let rest = image
        .path()
        .strip_prefix(base.path().trim_end_matches('/'))?;
    if !rest.starts_with('/') {
        return None;
    }

    let decoded = urlencoding::decode(rest).ok()?;
    if decoded.split('/').any(|segment| segment == "..") {
        return None;
    }
    Some(shared_path.join(decoded.trim_start_matches('/')))
}
