//! Twitter platform implementation
//!
//! Cookie-session client over reqwest: media files are uploaded first,
//! then the tweet is created with the caption and the uploaded media
//! ids. Unlike Instagram, a tweet without media is a valid post, so no
//! empty-image pre-check happens here.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::TwitterConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::Publisher;
use crate::types::SocialPlatform;

const API_BASE: &str = "https://api.twitter.com/1.1";
const UPLOAD_BASE: &str = "https://upload.twitter.com/1.1";

/// Twitter caps a tweet at four attached images.
pub const MAX_TWEET_IMAGES: usize = 4;

/// One media attachment of a tweet.
///
/// Alt text is a fixed placeholder and no users are tagged; the archive
/// carries neither.
struct MediaEntry {
    path: PathBuf,
    alt: &'static str,
    tagged_users: Vec<String>,
}

#[derive(Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

/// Map a non-2xx reply to a publish error carrying the failed operation.
fn ensure_success(status: reqwest::StatusCode, what: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(PlatformError::Publish(format!("{}: HTTP {}", what, status)).into())
    }
}

/// Authenticated Twitter account client.
pub struct TwitterClient {
    http: reqwest::Client,
}

impl TwitterClient {
    /// Log in with email, username and password.
    pub async fn login(config: &TwitterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| {
                PlatformError::Authentication(format!("Failed to build Twitter client: {}", e))
            })?;

        let response = http
            .post(format!("{}/account/login.json", API_BASE))
            .form(&[
                ("email", config.email.as_str()),
                ("username", config.username.as_str()),
                ("password", config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Authentication(format!("Twitter login failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PlatformError::Authentication(format!(
                "Twitter login failed: HTTP {}",
                response.status()
            ))
            .into());
        }

        Ok(Self { http })
    }

    /// Upload one media file, returning its platform media id.
    async fn upload_media(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PlatformError::Publish(format!("{}: {}", path.display(), e)))?;

        let form = reqwest::multipart::Form::new()
            .part("media", reqwest::multipart::Part::bytes(bytes));

        let response = self
            .http
            .post(format!("{}/media/upload.json", UPLOAD_BASE))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PlatformError::Publish(format!("Twitter media upload failed: {}", e)))?;

        ensure_success(response.status(), "Twitter media upload failed")?;

        let upload: MediaUploadResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Publish(format!("Twitter media upload failed: {}", e)))?;

        Ok(upload.media_id_string)
    }

    /// Post a tweet with the given text and media attachments.
    async fn tweet(&self, text: &str, media: &[MediaEntry]) -> Result<()> {
        let mut media_ids = Vec::with_capacity(media.len());
        for entry in media {
            let media_id = self.upload_media(&entry.path).await?;
            self.set_metadata(&media_id, entry).await?;
            media_ids.push(media_id);
        }

        let response = self
            .http
            .post(format!("{}/statuses/update.json", API_BASE))
            .form(&[
                ("status", text.to_string()),
                ("media_ids", media_ids.join(",")),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Publish(format!("Tweet failed: {}", e)))?;

        ensure_success(response.status(), "Tweet failed")
    }

    async fn set_metadata(&self, media_id: &str, entry: &MediaEntry) -> Result<()> {
        let body = serde_json::json!({
            "media_id": media_id,
            "alt_text": { "text": entry.alt },
            "tagged_users": entry.tagged_users,
        });

        let response = self
            .http
            .post(format!("{}/media/metadata/create.json", UPLOAD_BASE))
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::Publish(format!("Twitter media metadata failed: {}", e)))?;

        ensure_success(response.status(), "Twitter media metadata failed")
    }
}

/// Twitter publisher for the batch runner.
pub struct TwitterPublisher {
    client: TwitterClient,
}

impl TwitterPublisher {
    pub async fn login(config: &TwitterConfig) -> Result<Self> {
        let client = TwitterClient::login(config).await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    fn platform(&self) -> SocialPlatform {
        SocialPlatform::Twitter
    }

    fn max_images(&self) -> Option<usize> {
        Some(MAX_TWEET_IMAGES)
    }

    async fn publish(&self, caption: &str, images: &[PathBuf]) -> Result<()> {
        // No pre-check: a caption-only tweet is fine, and the path list
        // is already capped to MAX_TWEET_IMAGES at resolution time.
        let media: Vec<MediaEntry> = images
            .iter()
            .map(|path| MediaEntry {
                path: path.clone(),
                alt: "Image description",
                tagged_users: Vec::new(),
            })
            .collect();

        self.client.tweet(caption, &media).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepostError;

    #[test]
    fn test_ensure_success_accepts_2xx() {
        assert!(ensure_success(reqwest::StatusCode::OK, "Tweet failed").is_ok());
        assert!(ensure_success(reqwest::StatusCode::CREATED, "Tweet failed").is_ok());
    }

    #[test]
    fn test_ensure_success_rejects_error_replies() {
        // Every client call funnels its reply through this check, the
        // metadata call included.
        let error = ensure_success(
            reqwest::StatusCode::BAD_REQUEST,
            "Twitter media metadata failed",
        )
        .unwrap_err();

        match error {
            RepostError::Platform(PlatformError::Publish(message)) => {
                assert!(message.contains("Twitter media metadata failed"));
                assert!(message.contains("400"));
            }
            other => panic!("Expected a publish error, got {:?}", other),
        }
    }

    #[test]
    fn test_twitter_caps_attachments_at_four() {
        let publisher = TwitterPublisher {
            client: TwitterClient {
                http: reqwest::Client::new(),
            },
        };

        assert_eq!(publisher.max_images(), Some(MAX_TWEET_IMAGES));
        assert_eq!(publisher.platform(), SocialPlatform::Twitter);
    }
}
