//! Failure in the middle of a two-store write, and the sweep that repairs it.

mod common;

use axum::http::StatusCode;
use cloud_file_storage::services::reconcile::Reconciler;
use common::TestApp;
use std::sync::atomic::Ordering;

fn reconciler(t: &TestApp) -> Reconciler {
    Reconciler::new(t.blobs.clone(), t.metadata.clone(), &t.config)
}

#[tokio::test]
async fn test_blob_write_failure_creates_no_record() {
    let t = TestApp::new();
    let token = t.token("alice", None);
    t.blobs.fail_put.store(true, Ordering::SeqCst);

    let (status, json) = t.upload(&token, "a.txt", b"a").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "simulated blob put failure");

    let (_, list) = t.list(&token).await;
    assert!(TestApp::listed_ids(&list).is_empty());
    assert!(t.blobs.inner.is_empty());
}

#[tokio::test]
async fn test_metadata_write_failure_removes_the_blob() {
    let t = TestApp::new();
    let token = t.token("alice", None);
    t.metadata.fail_put.store(true, Ordering::SeqCst);

    let (status, json) = t.upload(&token, "a.txt", b"a").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "simulated metadata put failure");

    assert!(t.blobs.inner.is_empty());
    assert!(reconciler(&t).sweep().await.unwrap().is_consistent());
}

#[tokio::test]
async fn test_orphan_left_by_failed_compensation_is_swept() {
    let t = TestApp::new();
    let token = t.token("alice", None);
    t.metadata.fail_put.store(true, Ordering::SeqCst);
    t.blobs.fail_delete.store(true, Ordering::SeqCst);

    let (status, _) = t.upload(&token, "a.txt", b"a").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(t.blobs.inner.len(), 1);

    t.metadata.fail_put.store(false, Ordering::SeqCst);
    t.blobs.fail_delete.store(false, Ordering::SeqCst);

    let report = reconciler(&t).sweep().await.unwrap();
    assert_eq!(report.orphaned_blobs.len(), 1);
    assert!(report.orphaned_blobs[0].starts_with("alice/"));
    assert_eq!(report.repaired, 1);
    assert!(t.blobs.inner.is_empty());
}

#[tokio::test]
async fn test_blob_delete_failure_keeps_record() {
    let t = TestApp::new();
    let user = t.token("alice", None);
    let admin = t.token("root", Some("admin"));

    let (_, json) = t.upload(&user, "a.txt", b"a").await;
    let file_id = json["fileId"].as_str().unwrap().to_string();

    t.blobs.fail_delete.store(true, Ordering::SeqCst);
    let (status, _) = t.delete(&admin, &file_id).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, list) = t.list(&user).await;
    assert_eq!(TestApp::listed_ids(&list), vec![file_id.clone()]);

    // retry once the store recovers
    t.blobs.fail_delete.store(false, Ordering::SeqCst);
    let (status, _) = t.delete(&admin, &file_id).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_dangling_record_after_metadata_delete_failure_is_swept() {
    let t = TestApp::new();
    let user = t.token("alice", None);
    let admin = t.token("root", Some("admin"));

    let (_, json) = t.upload(&user, "a.txt", b"a").await;
    let file_id = json["fileId"].as_str().unwrap().to_string();

    t.metadata.fail_delete.store(true, Ordering::SeqCst);
    let (status, json) = t.delete(&admin, &file_id).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "simulated metadata delete failure");

    // blob is gone, record still listed
    assert!(t.blobs.inner.is_empty());
    let (_, list) = t.list(&user).await;
    assert_eq!(TestApp::listed_ids(&list), vec![file_id.clone()]);

    t.metadata.fail_delete.store(false, Ordering::SeqCst);
    let report = reconciler(&t).sweep().await.unwrap();
    assert_eq!(report.dangling_records, vec![file_id]);

    let (_, list) = t.list(&user).await;
    assert!(TestApp::listed_ids(&list).is_empty());
    let (status, _) = t.download(&user, "a.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scan_and_presign_failures_are_server_errors() {
    let t = TestApp::new();
    let token = t.token("alice", None);
    t.upload(&token, "a.txt", b"a").await;

    t.blobs.fail_presign.store(true, Ordering::SeqCst);
    let (status, json) = t.download(&token, "a.txt").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "simulated presign failure");

    t.metadata.fail_scan.store(true, Ordering::SeqCst);
    let (status, json) = t.list(&token).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "simulated metadata scan failure");
}
