//! Core types for weibo-repost

use serde::{Deserialize, Serialize};

/// An archived Weibo post, as written by the upstream ingester.
///
/// Read-only to this crate: the batch workflow only selects rows and
/// derives captions and image paths from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeiboPost {
    pub id: i64,
    /// Raw caption text, including the archive's image-count boilerplate.
    pub content: String,
    /// Comma-separated ordered list of image references; possibly empty.
    pub original_pictures: String,
    /// Unix timestamp. Orders the batch queue and names the image files.
    pub publish_time: i64,
}

impl WeiboPost {
    /// Number of images attached to this post.
    pub fn picture_count(&self) -> usize {
        if self.original_pictures.trim().is_empty() {
            0
        } else {
            self.original_pictures.split(',').count()
        }
    }
}

/// Target social platform. Stored in the `social_platform` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialPlatform {
    Instagram,
    Twitter,
}

impl SocialPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Twitter => "twitter",
        }
    }
}

impl std::fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal publish status for one (post, platform) pair.
///
/// There is no in-progress state: a row only exists once an attempt has
/// finished, and the absence of a row means the pair was never attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    Completed,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified publish result, persisted verbatim to the status table.
///
/// Both publishers produce the same shape so the persistence layer
/// always receives equal-fidelity error detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub status: PostStatus,
    pub error: Option<String>,
}

impl PublishOutcome {
    pub fn completed() -> Self {
        Self {
            status: PostStatus::Completed,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: PostStatus::Failed,
            error: Some(message.into()),
        }
    }
}

/// The latest recorded outcome for a (post, platform) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostStatusRecord {
    pub weibo_id: i64,
    pub social_platform: String,
    pub status: PostStatus,
    pub errors: Option<String>,
    /// Last-write time, assigned by the database on every upsert.
    pub timestamp: i64,
}
