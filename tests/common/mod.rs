#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bytes::Bytes;
use cloud_file_storage::config::AppConfig;
use cloud_file_storage::models::FileRecord;
use cloud_file_storage::services::blob_store::{BlobInfo, BlobStore, InMemoryBlobStore};
use cloud_file_storage::services::metadata_store::{
    InMemoryMetadataStore, MetadataStore, ScanFilter,
};
use cloud_file_storage::utils::auth::create_jwt;
use cloud_file_storage::{AppState, create_app};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tower::ServiceExt;

/// In-memory blob store whose operations can be made to fail on demand.
#[derive(Default)]
pub struct FlakyBlobStore {
    pub inner: InMemoryBlobStore,
    pub fail_put: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_presign: AtomicBool,
}

fn check(flag: &AtomicBool, op: &str) -> anyhow::Result<()> {
    if flag.load(Ordering::SeqCst) {
        Err(anyhow!("simulated {} failure", op))
    } else {
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> anyhow::Result<()> {
        check(&self.fail_put, "blob put")?;
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> anyhow::Result<Bytes> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        check(&self.fail_delete, "blob delete")?;
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        self.inner.exists(key).await
    }

    async fn list(&self, prefix: &str) -> anyhow::Result<Vec<BlobInfo>> {
        self.inner.list(prefix).await
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> anyhow::Result<String> {
        check(&self.fail_presign, "presign")?;
        self.inner.presign_get(key, expires_in).await
    }
}

/// In-memory metadata table whose operations can be made to fail on demand.
#[derive(Default)]
pub struct FlakyMetadataStore {
    pub inner: InMemoryMetadataStore,
    pub fail_put: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_scan: AtomicBool,
}

#[async_trait]
impl MetadataStore for FlakyMetadataStore {
    async fn put(&self, record: &FileRecord) -> anyhow::Result<()> {
        check(&self.fail_put, "metadata put")?;
        self.inner.put(record).await
    }

    async fn get(&self, file_id: &str) -> anyhow::Result<Option<FileRecord>> {
        self.inner.get(file_id).await
    }

    async fn delete(&self, file_id: &str) -> anyhow::Result<()> {
        check(&self.fail_delete, "metadata delete")?;
        self.inner.delete(file_id).await
    }

    async fn scan(&self, filter: Option<ScanFilter<'_>>) -> anyhow::Result<Vec<FileRecord>> {
        check(&self.fail_scan, "metadata scan")?;
        self.inner.scan(filter).await
    }
}

pub struct TestApp {
    pub app: Router,
    pub blobs: Arc<FlakyBlobStore>,
    pub metadata: Arc<FlakyMetadataStore>,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let blobs = Arc::new(FlakyBlobStore::default());
        let metadata = Arc::new(FlakyMetadataStore::default());
        let state = AppState::new(blobs.clone(), metadata.clone(), config.clone());

        Self {
            app: create_app(state),
            blobs,
            metadata,
            config,
        }
    }

    pub fn token(&self, sub: &str, role: Option<&str>) -> String {
        create_jwt(
            sub,
            Some(&format!("{}@example.com", sub)),
            role,
            chrono::Duration::hours(1),
            &self.config.jwt_secret,
        )
        .unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    pub async fn upload(&self, token: &str, file_name: &str, data: &[u8]) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/files")
                .header("Authorization", format!("Bearer {}", token))
                .header("file-name", file_name)
                .header("content-type", "text/plain")
                .body(Body::from(data.to_vec()))
                .unwrap(),
        )
        .await
    }

    pub async fn list(&self, token: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri("/files")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn download(&self, token: &str, file_name: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/download")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(json!({ "fileName": file_name }).to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, token: &str, file_id: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/delete")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(json!({ "fileId": file_id }).to_string()))
                .unwrap(),
        )
        .await
    }

    pub fn listed_ids(list: &Value) -> Vec<String> {
        list.as_array()
            .unwrap()
            .iter()
            .map(|f| f["fileId"].as_str().unwrap().to_string())
            .collect()
    }
}
