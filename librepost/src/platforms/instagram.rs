//! Instagram platform implementation
//!
//! Wraps Instagram's private mobile API over reqwest. A post with one
//! image goes through the single-photo upload endpoint, a post with
//! several images through the album endpoint. Instagram rejects posts
//! without media, so an empty image list fails before any network call.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::InstagramConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::Publisher;
use crate::types::SocialPlatform;

const API_BASE: &str = "https://i.instagram.com/api/v1";
const USER_AGENT: &str = "Instagram 269.0.0.18.75 Android";

/// Authenticated Instagram client.
///
/// Session cookies from login are held in the reqwest cookie store and
/// sent with every subsequent upload call.
pub struct InstagramClient {
    http: reqwest::Client,
}

impl InstagramClient {
    /// Log in with username and password.
    pub async fn login(config: &InstagramConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| {
                PlatformError::Authentication(format!("Failed to build Instagram client: {}", e))
            })?;

        let response = http
            .post(format!("{}/accounts/login/", API_BASE))
            .form(&[
                ("username", config.username.as_str()),
                ("password", config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Authentication(format!("Instagram login failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PlatformError::Authentication(format!(
                "Instagram login failed: HTTP {}",
                response.status()
            ))
            .into());
        }

        Ok(Self { http })
    }

    /// Upload a single photo with a caption.
    pub async fn photo_upload(&self, image: &Path, caption: &str) -> Result<()> {
        let form = reqwest::multipart::Form::new()
            .text("caption", caption.to_string())
            .part("photo", file_part(image).await?);

        self.send_upload("media/photo/", form).await
    }

    /// Upload several photos as one album with a shared caption.
    pub async fn album_upload(&self, images: &[PathBuf], caption: &str) -> Result<()> {
        let mut form = reqwest::multipart::Form::new().text("caption", caption.to_string());
        for image in images {
            form = form.part("photos[]", file_part(image).await?);
        }

        self.send_upload("media/album/", form).await
    }

    async fn send_upload(&self, endpoint: &str, form: reqwest::multipart::Form) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/{}", API_BASE, endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PlatformError::Publish(format!("Instagram upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PlatformError::Publish(format!(
                "Instagram upload failed: HTTP {}",
                response.status()
            ))
            .into());
        }

        Ok(())
    }
}

/// Read an image file into a multipart part, named after the file.
///
/// A missing or unreadable file fails here, with the IO error as the
/// message; paths are never checked earlier.
async fn file_part(path: &Path) -> Result<reqwest::multipart::Part> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| PlatformError::Publish(format!("{}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.jpg".to_string());

    Ok(reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("image/jpeg")
        .map_err(|e| PlatformError::Publish(e.to_string()))?)
}

/// Instagram publisher for the batch runner.
pub struct InstagramPublisher {
    client: InstagramClient,
}

impl InstagramPublisher {
    pub async fn login(config: &InstagramConfig) -> Result<Self> {
        let client = InstagramClient::login(config).await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Publisher for InstagramPublisher {
    fn platform(&self) -> SocialPlatform {
        SocialPlatform::Instagram
    }

    async fn publish(&self, caption: &str, images: &[PathBuf]) -> Result<()> {
        match images {
            [] => Err(PlatformError::NoImages.into()),
            [single] => self.client.photo_upload(single, caption).await,
            many => self.client.album_upload(many, caption).await,
        }
    }
}
