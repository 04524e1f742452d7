//! Twitter/X publish adapter.
//!
//! Three sub-steps: download the generated image, upload it to the media
//! endpoint, create the post referencing the returned media handle. A
//! failure at any step aborts the whole publish; already-uploaded media is
//! not cleaned up.

use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TwitterConfig;
use crate::social::oauth::{authorization_header, OAuth1Credentials};

const MEDIA_UPLOAD_URL: &str = "https://upload.twitter.com/1.1/media/upload.json";
const CREATE_TWEET_URL: &str = "https://api.twitter.com/2/tweets";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to download image (status {status})")]
    ImageDownload { status: u16 },

    #[error("media upload failed (status {status}): {message}")]
    MediaUpload { status: u16, message: String },

    #[error("tweet creation failed (status {status}): {message}")]
    TweetCreate { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Debug, Serialize)]
struct TweetRequest<'a> {
    text: &'a str,
    media: TweetMedia,
}

#[derive(Debug, Serialize)]
struct TweetMedia {
    media_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

/// The created post.
#[derive(Debug, Clone, Serialize)]
pub struct PostedTweet {
    pub tweet_id: String,
}

#[derive(Clone)]
pub struct TwitterClient {
    http: Client,
    credentials: OAuth1Credentials,
}

impl TwitterClient {
    pub fn new(config: TwitterConfig) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            credentials: OAuth1Credentials {
                consumer_key: config.api_key,
                consumer_secret: config.api_secret,
                access_token: config.access_token,
                token_secret: config.access_token_secret,
            },
        }
    }

    /// Downloads the image, uploads it as media, and creates the post.
    pub async fn post(&self, text: &str, image_url: &str) -> Result<PostedTweet, PublishError> {
        info!("Publishing tweet");

        let image = self.http.get(image_url).send().await?;
        if !image.status().is_success() {
            return Err(PublishError::ImageDownload {
                status: image.status().as_u16(),
            });
        }
        let image_bytes = image.bytes().await?;
        debug!("Downloaded image ({} bytes)", image_bytes.len());

        let media_id = self.upload_media(image_bytes.to_vec()).await?;
        debug!("Media uploaded: {media_id}");

        self.create_tweet(text, media_id).await
    }

    async fn upload_media(&self, image: Vec<u8>) -> Result<String, PublishError> {
        // Multipart bodies are excluded from the OAuth signature.
        let header = authorization_header(&self.credentials, "POST", MEDIA_UPLOAD_URL, &[]);
        let form = multipart::Form::new().part("media", multipart::Part::bytes(image));

        let response = self
            .http
            .post(MEDIA_UPLOAD_URL)
            .header("Authorization", header)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::MediaUpload {
                status: status.as_u16(),
                message,
            });
        }

        let upload: MediaUploadResponse = response.json().await?;
        Ok(upload.media_id_string)
    }

    async fn create_tweet(
        &self,
        text: &str,
        media_id: String,
    ) -> Result<PostedTweet, PublishError> {
        let header = authorization_header(&self.credentials, "POST", CREATE_TWEET_URL, &[]);
        let body = TweetRequest {
            text,
            media: TweetMedia {
                media_ids: vec![media_id],
            },
        };

        let response = self
            .http
            .post(CREATE_TWEET_URL)
            .header("Authorization", header)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 201 {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::TweetCreate {
                status: status.as_u16(),
                message,
            });
        }

        let tweet: TweetResponse = response.json().await?;
        info!("Tweet created: {}", tweet.data.id);
        Ok(PostedTweet {
            tweet_id: tweet.data.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweet_request_body_shape() {
        let body = TweetRequest {
            text: "fresh sourdough is here",
            media: TweetMedia {
                media_ids: vec!["12345".to_string()],
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": "fresh sourdough is here",
                "media": {"media_ids": ["12345"]}
            })
        );
    }

    #[test]
    fn test_media_upload_response_parses() {
        let json = r#"{"media_id": 710511363345354753, "media_id_string": "710511363345354753"}"#;
        let response: MediaUploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.media_id_string, "710511363345354753");
    }

    #[test]
    fn test_tweet_response_parses() {
        let json = r#"{"data": {"id": "1445880548472328192", "text": "hi"}}"#;
        let response: TweetResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.id, "1445880548472328192");
    }
}
