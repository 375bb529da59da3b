//! Batch dispatch workflow
//!
//! One run: fetch a batch of unpublished posts, then for each post
//! clean the caption, resolve image paths, publish, and persist the
//! outcome, pausing between posts to respect platform rate limits.
//! A single post's failure never aborts the rest of the batch; a fetch
//! failure ends the run with nothing processed.

use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::caption::clean_caption;
use crate::db::Database;
use crate::error::{RepostError, Result};
use crate::images::resolve_image_paths;
use crate::platforms::Publisher;
use crate::types::{PostStatus, PublishOutcome};

/// What one run did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Posts returned by the batch fetch.
    pub fetched: usize,
    /// Posts whose publish succeeded.
    pub completed: usize,
    /// Posts whose publish failed (the failure is persisted and the
    /// post stays eligible for the next run).
    pub failed: usize,
}

pub struct BatchRunner<P: Publisher> {
    db: Database,
    publisher: P,
    image_dir: PathBuf,
    post_delay: Duration,
}

impl<P: Publisher> BatchRunner<P> {
    pub fn new(
        db: Database,
        publisher: P,
        image_dir: impl Into<PathBuf>,
        post_delay: Duration,
    ) -> Self {
        Self {
            db,
            publisher,
            image_dir: image_dir.into(),
            post_delay,
        }
    }

    /// Execute one batch run.
    ///
    /// Processing is strictly sequential: publishing is never in flight
    /// for two posts at once, and the inter-post delay runs after every
    /// post, failures included. Persist failures are logged and skip to
    /// the next post.
    pub async fn run(&self, batch_number: u32, batch_size: u32) -> Result<RunSummary> {
        let platform = self.publisher.platform();
        let posts = self
            .db
            .fetch_candidates(platform, batch_number, batch_size)
            .await?;

        let mut summary = RunSummary {
            fetched: posts.len(),
            ..Default::default()
        };

        for post in &posts {
            let caption = clean_caption(&post.content);
            let images =
                resolve_image_paths(&self.image_dir, post, self.publisher.max_images());

            let outcome = match self.publisher.publish(&caption, &images).await {
                Ok(()) => {
                    info!(post_id = post.id, platform = %platform, "post published");
                    PublishOutcome::completed()
                }
                Err(e) => {
                    error!(post_id = post.id, platform = %platform, error = %e, "publish failed");
                    PublishOutcome::failed(error_detail(&e))
                }
            };

            match self.db.upsert_status(post.id, platform, &outcome).await {
                Ok(()) => match outcome.status {
                    PostStatus::Completed => summary.completed += 1,
                    PostStatus::Failed => summary.failed += 1,
                },
                Err(e) => {
                    // The post stays eligible; the next run retries it.
                    error!(post_id = post.id, platform = %platform, error = %e, "failed to persist status");
                }
            }

            sleep(self.post_delay).await;
        }

        info!(
            platform = %platform,
            fetched = summary.fetched,
            completed = summary.completed,
            failed = summary.failed,
            "batch run finished"
        );

        Ok(summary)
    }
}

/// Error text persisted to the status table.
///
/// Platform failures are stored as the client's own message, without
/// the enclosing error-category prefix.
fn error_detail(error: &RepostError) -> String {
    match error {
        RepostError::Platform(e) => e.to_string(),
        other => other.to_string(),
    }
}
