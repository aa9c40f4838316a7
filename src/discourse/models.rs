use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A forum topic as listed in `/latest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

/// A topic refetched from `/t/{id}.json`, including its first post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDetail {
    pub topic: Topic,
    /// Rendered ("cooked") HTML of the first post.
    pub body_html: Option<String>,
}

impl TopicDetail {
    /// HTML to scan for mentions: the first post, else the list excerpt.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body_html
            .as_deref()
            .or(self.topic.excerpt.as_deref())
    }

    /// Keep the excerpt from the listing the topic was queued from; the
    /// detail endpoint does not return one.
    #[must_use]
    pub fn with_listing_excerpt(mut self, listed: &Topic) -> Self {
        if self.topic.excerpt.is_none() {
            self.topic.excerpt.clone_from(&listed.excerpt);
        }
        self
    }
}

impl From<Topic> for TopicDetail {
    fn from(topic: Topic) -> Self {
        Self {
            topic,
            body_html: None,
        }
    }
}

/// Response body of `GET /latest.json`.
#[derive(Debug, Deserialize)]
pub struct LatestTopicsResponse {
    pub topic_list: TopicList,
}

#[derive(Debug, Deserialize)]
pub struct TopicList {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// Response body of `GET /t/{id}.json`.
#[derive(Debug, Deserialize)]
pub struct TopicResponse {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub post_stream: PostStream,
}

#[derive(Debug, Deserialize)]
pub struct PostStream {
    #[serde(default)]
    pub posts: Vec<TopicPost>,
}

#[derive(Debug, Deserialize)]
pub struct TopicPost {
    pub post_number: u64,
    #[serde(default)]
    pub cooked: String,
}

impl From<TopicResponse> for TopicDetail {
    fn from(response: TopicResponse) -> Self {
        let body_html = response
            .post_stream
            .posts
            .into_iter()
            .find(|p| p.post_number == 1)
            .map(|p| p.cooked);

        Self {
            topic: Topic {
                id: response.id,
                title: response.title,
                slug: response.slug,
                created_at: response.created_at,
                image_url: response.image_url,
                excerpt: None,
            },
            body_html,
        }
    }
}

/// Response body of `GET /session/current.json`.
#[derive(Debug, Deserialize)]
pub struct CurrentSessionResponse {
    pub current_user: CurrentUser,
}

#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LATEST_JSON: &str = r#"{
        "users": [],
        "topic_list": {
            "per_page": 30,
            "topics": [
                {
                    "id": 101,
                    "title": "Spring meetup",
                    "fancy_title": "Spring meetup",
                    "slug": "spring-meetup",
                    "posts_count": 1,
                    "created_at": "2024-03-01T12:00:00.000Z",
                    "image_url": "https://forum.example.com/uploads/default/original/1X/abc.png",
                    "excerpt": "With <a>@alice</a>"
                },
                {
                    "id": 98,
                    "title": "Welcome",
                    "slug": "welcome",
                    "created_at": "2024-02-01T08:30:00.000Z",
                    "image_url": null
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_latest_topics() {
        let response: LatestTopicsResponse = serde_json::from_str(LATEST_JSON).unwrap();
        let topics = response.topic_list.topics;
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].id, 101);
        assert_eq!(topics[0].slug, "spring-meetup");
        assert!(topics[0].image_url.is_some());
        assert_eq!(topics[1].image_url, None);
        assert_eq!(topics[1].excerpt, None);
    }

    #[test]
    fn test_topic_response_takes_first_post() {
        let json = r#"{
            "id": 103,
            "title": "Release notes",
            "slug": "release-notes",
            "created_at": "2024-03-02T10:00:00Z",
            "post_stream": {
                "posts": [
                    {"post_number": 2, "cooked": "<p>reply</p>"},
                    {"post_number": 1, "cooked": "<p>By <a>@carol</a></p>"}
                ]
            }
        }"#;
        let response: TopicResponse = serde_json::from_str(json).unwrap();
        let detail = TopicDetail::from(response);
        assert_eq!(detail.topic.id, 103);
        assert_eq!(detail.body(), Some("<p>By <a>@carol</a></p>"));
    }

    #[test]
    fn test_refetched_detail_keeps_listing_excerpt() {
        let listing: LatestTopicsResponse = serde_json::from_str(LATEST_JSON).unwrap();
        let listed = listing.topic_list.topics[0].clone();
        let json = r#"{
            "id": 101,
            "title": "Spring meetup",
            "slug": "spring-meetup",
            "created_at": "2024-03-01T12:00:00Z",
            "post_stream": {"posts": []}
        }"#;
        let response: TopicResponse = serde_json::from_str(json).unwrap();
        let detail = TopicDetail::from(response).with_listing_excerpt(&listed);
        assert_eq!(detail.body_html, None);
        assert_eq!(detail.body(), Some("With <a>@alice</a>"));
    }

    #[test]
    fn test_body_falls_back_to_excerpt() {
        let response: LatestTopicsResponse = serde_json::from_str(LATEST_JSON).unwrap();
        let topic = response.topic_list.topics[0].clone();
        let detail = TopicDetail::from(topic);
        assert_eq!(detail.body(), Some("With <a>@alice</a>"));
    }
}
