//! Platform abstraction and implementations
//!
//! A `Publisher` wraps an authenticated client for one social platform
//! and delivers a prepared post (cleaned caption plus resolved image
//! paths). Transport details are the client's problem; the batch runner
//! only sees success or a `PlatformError`.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::types::SocialPlatform;

pub mod instagram;
pub mod twitter;

// Mock publisher is available for all builds (not just tests) to
// support integration tests.
pub mod mock;

/// Unified publishing interface for the batch runner.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// The platform this publisher delivers to.
    fn platform(&self) -> SocialPlatform;

    /// Maximum number of attached images the platform accepts, if any.
    ///
    /// The image path resolver caps at this limit, silently dropping
    /// later images.
    fn max_images(&self) -> Option<usize> {
        None
    }

    /// Deliver one post.
    ///
    /// Exactly one platform interaction per call; no local state is
    /// mutated. Any client failure comes back as
    /// `PlatformError::Publish` (or `PlatformError::NoImages` for a
    /// platform that refuses image-less posts), which the runner maps
    /// to a `failed` status with the error text.
    async fn publish(&self, caption: &str, images: &[PathBuf]) -> Result<()>;
}
