//! weibo-repost - Repost archived Weibo content to other social networks
//!
//! This library provides the core batch dispatch workflow: select posts
//! that have not yet been published to a platform, attempt delivery
//! through a platform-specific client, and durably record the outcome so
//! the next run retries failures and skips completed work.

pub mod caption;
pub mod config;
pub mod db;
pub mod error;
pub mod images;
pub mod platforms;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{RepostError, Result};
pub use runner::{BatchRunner, RunSummary};
pub use types::{PostStatus, PublishOutcome, SocialPlatform, WeiboPost};
