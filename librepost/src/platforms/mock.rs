//! Mock publisher for testing
//!
//! A configurable publisher that records what would have been posted
//! instead of talking to a platform. Used by runner and integration
//! tests to verify the batch workflow without credentials or network
//! access.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Publisher;
use crate::types::SocialPlatform;

/// A single recorded publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPublish {
    pub caption: String,
    pub images: Vec<PathBuf>,
}

/// Mock publisher with scripted success or failure.
///
/// Clones share the recorded call list, so a test can hand one clone to
/// the runner and observe through the other.
#[derive(Clone)]
pub struct MockPublisher {
    platform: SocialPlatform,
    max_images: Option<usize>,
    error: Option<PlatformError>,
    calls: Arc<Mutex<Vec<RecordedPublish>>>,
}

impl MockPublisher {
    /// A publisher whose every publish succeeds.
    pub fn success(platform: SocialPlatform) -> Self {
        Self {
            platform,
            max_images: None,
            error: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A publisher whose every publish fails with the given message.
    pub fn failure(platform: SocialPlatform, error: &str) -> Self {
        Self {
            platform,
            max_images: None,
            error: Some(PlatformError::Publish(error.to_string())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set an attachment cap, like the real Twitter publisher.
    pub fn with_max_images(mut self, max: usize) -> Self {
        self.max_images = Some(max);
        self
    }

    /// Number of publish calls made so far.
    pub fn publish_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Everything that was published, in order.
    pub fn published(&self) -> Vec<RecordedPublish> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    fn platform(&self) -> SocialPlatform {
        self.platform
    }

    fn max_images(&self) -> Option<usize> {
        self.max_images
    }

    async fn publish(&self, caption: &str, images: &[PathBuf]) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedPublish {
            caption: caption.to_string(),
            images: images.to_vec(),
        });

        match &self.error {
            Some(e) => Err(e.clone().into()),
            None => Ok(()),
        }
    }
}
