//! Image path resolution
//!
//! The archive stores a post's images on disk under a deterministic
//! naming scheme: `{YYYYMMDD}_{post id}_{ordinal}.jpg`, where the date
//! comes from the post's publish time and the ordinal is 1-based.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::types::WeiboPost;

/// Derive the local file paths for a post's images.
///
/// The number of paths is the post's picture count, capped to
/// `max_images` when the target platform has an attachment limit;
/// images past the cap are silently dropped. File existence is not
/// checked here: a missing file surfaces through the platform client's
/// own upload error.
pub fn resolve_image_paths(
    base_dir: &Path,
    post: &WeiboPost,
    max_images: Option<usize>,
) -> Vec<PathBuf> {
    let mut count = post.picture_count();
    if let Some(max) = max_images {
        count = count.min(max);
    }

    let date = DateTime::<Utc>::from_timestamp(post.publish_time, 0)
        .unwrap_or_default()
        .format("%Y%m%d");

    (1..=count)
        .map(|i| base_dir.join(format!("{}_{}_{}.jpg", date, post.id, i)))
        .collect()
}
