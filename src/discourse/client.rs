use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{
    CurrentSessionResponse, LatestTopicsResponse, Topic, TopicDetail, TopicResponse,
};
use super::{DiscourseError, ForumApi};
use crate::config::Config;
use crate::constants::USER_AGENT;

/// Authenticated Discourse API client.
#[derive(Clone)]
pub struct DiscourseClient {
    http: Client,
    base_url: String,
    api_user: String,
    api_key: String,
}

impl DiscourseClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, DiscourseError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.forum_base_url().to_string(),
            api_user: config.discourse_api_user.clone(),
            api_key: config.discourse_api_key.clone(),
        })
    }

    /// Check that the API key is accepted and return the username it acts as.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the key is rejected.
    pub async fn verify_credentials(&self) -> Result<String, DiscourseError> {
        let session: CurrentSessionResponse = self.get_json("/session/current.json").await?;
        Ok(session.current_user.username)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DiscourseError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "Discourse request");

        let response = self
            .http
            .get(&url)
            .header("Api-Key", &self.api_key)
            .header("Api-Username", &self.api_user)
            .header("Accept", "application/json")
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

async fn check_status(response: Response) -> Result<Response, DiscourseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown".to_string());
    Err(DiscourseError::Status { status, body })
}

#[async_trait]
impl ForumApi for DiscourseClient {
    async fn latest_topics(&self) -> Result<Vec<Topic>, DiscourseError> {
        let latest: LatestTopicsResponse = self.get_json("/latest.json").await?;
        Ok(latest.topic_list.topics)
    }

    async fn get_topic(&self, id: u64) -> Result<TopicDetail, DiscourseError> {
        match self.get_json::<TopicResponse>(&format!("/t/{id}.json")).await {
            Ok(topic) => Ok(topic.into()),
            Err(DiscourseError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(DiscourseError::NotFound(id))
            }
            Err(e) => Err(e),
        }
    }
}
