//! End-to-end tests for the batch dispatch workflow
//!
//! Exercises the full path against an on-disk database: fetch a batch,
//! publish through a mock publisher, persist outcomes, and verify the
//! convergence properties across runs.

use librepost::platforms::mock::MockPublisher;
use librepost::{
    BatchRunner, Database, PostStatus, PublishOutcome, SocialPlatform, WeiboPost,
};
use std::time::Duration;
use tempfile::TempDir;

async fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("repost.db");
    let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
    (db, temp_dir)
}

fn post(id: i64, content: &str, pictures: &str, publish_time: i64) -> WeiboPost {
    WeiboPost {
        id,
        content: content.to_string(),
        original_pictures: pictures.to_string(),
        publish_time,
    }
}

async fn seed(db: &Database, count: i64) {
    for i in 1..=count {
        db.insert_post(&post(i, &format!("post {}", i), "a,b", i * 100))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn batches_converge_to_all_posted() {
    let (db, _tmp) = setup_db().await;
    seed(&db, 5).await;

    // Batch size 2: batches 1..=3 cover all five posts.
    for batch in 1..=3 {
        let publisher = MockPublisher::success(SocialPlatform::Instagram);
        let runner = BatchRunner::new(db.clone(), publisher, "/images", Duration::ZERO);
        runner.run(batch, 2).await.unwrap();
    }

    for id in 1..=5 {
        let record = db
            .status_for(id, SocialPlatform::Instagram)
            .await
            .unwrap()
            .expect("every post should have a status row");
        assert_eq!(record.status, PostStatus::Completed);
    }

    // Everything completed: batch 1 of a fresh run is empty.
    let publisher = MockPublisher::success(SocialPlatform::Instagram);
    let runner = BatchRunner::new(db.clone(), publisher, "/images", Duration::ZERO);
    let summary = runner.run(1, 2).await.unwrap();
    assert_eq!(summary.fetched, 0);

    db.close().await;
}

#[tokio::test]
async fn failed_runs_retry_until_completed() {
    let (db, _tmp) = setup_db().await;
    seed(&db, 2).await;

    // First run fails everything.
    let publisher = MockPublisher::failure(SocialPlatform::Twitter, "relay unreachable");
    let runner = BatchRunner::new(db.clone(), publisher, "/images", Duration::ZERO);
    let summary = runner.run(1, 20).await.unwrap();
    assert_eq!(summary.failed, 2);

    let record = db
        .status_for(1, SocialPlatform::Twitter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, PostStatus::Failed);
    assert_eq!(record.errors.as_deref(), Some("relay unreachable"));

    // Second run picks the same posts up again and succeeds.
    let publisher = MockPublisher::success(SocialPlatform::Twitter);
    let runner = BatchRunner::new(db.clone(), publisher, "/images", Duration::ZERO);
    let summary = runner.run(1, 20).await.unwrap();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.completed, 2);

    let record = db
        .status_for(1, SocialPlatform::Twitter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, PostStatus::Completed);
    assert_eq!(record.errors, None);

    db.close().await;
}

#[tokio::test]
async fn platforms_do_not_share_status() {
    let (db, _tmp) = setup_db().await;
    seed(&db, 1).await;

    let publisher = MockPublisher::success(SocialPlatform::Instagram);
    let runner = BatchRunner::new(db.clone(), publisher, "/images", Duration::ZERO);
    runner.run(1, 20).await.unwrap();

    // Instagram is done; Twitter still sees the post.
    let publisher = MockPublisher::success(SocialPlatform::Twitter).with_max_images(4);
    let runner = BatchRunner::new(db.clone(), publisher, "/images", Duration::ZERO);
    let summary = runner.run(1, 20).await.unwrap();
    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.completed, 1);

    db.close().await;
}

#[tokio::test]
async fn prepared_inputs_reach_the_publisher() {
    let (db, _tmp) = setup_db().await;
    // 2024-05-01 00:00:00 UTC, six pictures, boilerplate caption.
    db.insert_post(&post(
        42,
        "[组图共6张] 原图 Spring outing",
        "a,b,c,d,e,f",
        1714521600,
    ))
    .await
    .unwrap();

    let publisher = MockPublisher::success(SocialPlatform::Twitter).with_max_images(4);
    let observer = publisher.clone();
    let runner = BatchRunner::new(db.clone(), publisher, "/images", Duration::ZERO);
    runner.run(1, 20).await.unwrap();

    let published = observer.published();
    assert_eq!(published.len(), 1);
    // Boilerplate stripped, image list capped to the platform limit.
    assert_eq!(published[0].caption, "Spring outing");
    assert_eq!(published[0].images.len(), 4);
    assert_eq!(
        published[0].images[0].to_str().unwrap(),
        "/images/20240501_42_1.jpg"
    );

    let record = db
        .status_for(42, SocialPlatform::Twitter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, PostStatus::Completed);

    db.close().await;
}

#[tokio::test]
async fn manual_outcome_writes_respect_last_write_wins() {
    let (db, _tmp) = setup_db().await;
    seed(&db, 1).await;

    db.upsert_status(1, SocialPlatform::Instagram, &PublishOutcome::failed("first"))
        .await
        .unwrap();
    db.upsert_status(
        1,
        SocialPlatform::Instagram,
        &PublishOutcome::failed("second"),
    )
    .await
    .unwrap();

    let record = db
        .status_for(1, SocialPlatform::Instagram)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.errors.as_deref(), Some("second"));

    db.close().await;
}
