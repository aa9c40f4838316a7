use std::path::Path;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::oauth::OAuthCredentials;
use super::{PostedStatus, StatusPoster, TwitterError};
use crate::config::Config;
use crate::constants::USER_AGENT;

#[derive(Debug, Deserialize)]
struct VerifyCredentialsResponse {
    screen_name: String,
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Debug, Serialize)]
struct CreateTweetRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<TweetMedia>,
}

#[derive(Debug, Serialize)]
struct TweetMedia {
    media_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

/// OAuth 1.0a user-context Twitter client.
#[derive(Clone)]
pub struct TwitterClient {
    http: Client,
    api_url: String,
    upload_url: String,
    credentials: OAuthCredentials,
}

impl TwitterClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, TwitterError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_url: config.twitter_api_url.trim_end_matches('/').to_string(),
            upload_url: config.twitter_upload_url.trim_end_matches('/').to_string(),
            credentials: OAuthCredentials {
                consumer_key: config.twitter_api_key.clone(),
                consumer_secret: config.twitter_api_secret.clone(),
                token: config.twitter_access_token.clone(),
                token_secret: config.twitter_access_token_secret.clone(),
            },
        })
    }

    /// Check the access token and return the account's screen name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    pub async fn verify_credentials(&self) -> Result<String, TwitterError> {
        let url = format!("{}/1.1/account/verify_credentials.json", self.api_url);
        let auth = self.credentials.authorization_header("GET", &url, &[]);

        let response = self
            .http
            .get(&url)
            .header("Authorization", auth)
            .send()
            .await?;
        let account: VerifyCredentialsResponse = check_status(response).await?.json().await?;
        Ok(account.screen_name)
    }

    /// Upload a media file and return its media id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload is rejected.
    pub async fn upload_media(&self, path: &Path) -> Result<String, TwitterError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| TwitterError::Media {
                path: path.to_path_buf(),
                source,
            })?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("media")
            .to_string();

        let url = format!("{}/1.1/media/upload.json", self.upload_url);
        let auth = self.credentials.authorization_header("POST", &url, &[]);
        let part = multipart::Part::bytes(bytes).file_name(filename);
        let form = multipart::Form::new().part("media", part);

        debug!(url = %url, file = %path.display(), "Uploading media");

        let response = self
            .http
            .post(&url)
            .header("Authorization", auth)
            .multipart(form)
            .send()
            .await?;
        let uploaded: MediaUploadResponse = check_status(response).await?.json().await?;
        Ok(uploaded.media_id_string)
    }

    async fn create_tweet(
        &self,
        text: &str,
        media_ids: Vec<String>,
    ) -> Result<PostedStatus, TwitterError> {
        let url = format!("{}/2/tweets", self.api_url);
        let auth = self.credentials.authorization_header("POST", &url, &[]);
        let body = CreateTweetRequest {
            text,
            media: (!media_ids.is_empty()).then_some(TweetMedia { media_ids }),
        };

        let response = self
            .http
            .post(&url)
            .header("Authorization", auth)
            .json(&body)
            .send()
            .await?;
        let created: CreateTweetResponse = check_status(response).await?.json().await?;

        info!(tweet_id = %created.data.id, "Status posted");
        Ok(PostedStatus {
            id: created.data.id,
        })
    }
}

async fn check_status(response: Response) -> Result<Response, TwitterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown".to_string());
    Err(TwitterError::Status { status, body })
}

#[async_trait]
impl StatusPoster for TwitterClient {
    async fn post_status(&self, text: &str) -> Result<PostedStatus, TwitterError> {
        self.create_tweet(text, Vec::new()).await
    }

    async fn post_status_with_media(
        &self,
        text: &str,
        media: &Path,
    ) -> Result<PostedStatus, TwitterError> {
        let media_id = self.upload_media(media).await?;
        self.create_tweet(text, vec![media_id]).await
    }
}
