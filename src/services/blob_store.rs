use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use sha2::{Digest, Sha256};
use std::time::Duration;

pub struct BlobInfo {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Byte payloads addressed by an opaque key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Bytes>;
    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;
    async fn list(&self, prefix: &str) -> Result<Vec<BlobInfo>>;
    /// Time-limited URL that fetches the object without further credentials.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String>;
}

pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(res.body.collect().await?.into_bytes())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow!(service_error))
                }
            }
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobInfo>> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let res = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token)
                .send()
                .await?;

            for object in res.contents.unwrap_or_default() {
                if let Some(key) = object.key {
                    let last_modified = object
                        .last_modified
                        .and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos()));
                    objects.push(BlobInfo {
                        key,
                        size: object.size.unwrap_or(0),
                        last_modified,
                    });
                }
            }

            if res.is_truncated.unwrap_or(false) {
                continuation_token = res.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(objects)
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(expires_in)?)
            .await?;
        Ok(presigned.uri().to_string())
    }
}

struct StoredBlob {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// Process-local blob store. Presigned URLs use the `memory://` scheme and are
/// redeemed through [`InMemoryBlobStore::fetch_presigned`].
pub struct InMemoryBlobStore {
    blobs: DashMap<String, StoredBlob>,
    signing_key: String,
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: DashMap::new(),
            signing_key: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.blobs.get(key).map(|b| b.content_type.clone())
    }

    /// Backdates an object, for exercising age-based logic.
    pub fn set_last_modified(&self, key: &str, at: DateTime<Utc>) {
        if let Some(mut blob) = self.blobs.get_mut(key) {
            blob.last_modified = at;
        }
    }

    pub fn fetch_presigned(&self, url: &str) -> Result<Bytes> {
        self.fetch_presigned_at(url, Utc::now())
    }

    pub fn fetch_presigned_at(&self, url: &str, now: DateTime<Utc>) -> Result<Bytes> {
        let parsed = url::Url::parse(url)?;
        if parsed.scheme() != "memory" {
            return Err(anyhow!("not an in-memory URL: {}", url));
        }

        let key = percent_decode_str(parsed.path().trim_start_matches('/'))
            .decode_utf8()?
            .into_owned();

        let mut expires = None;
        let mut signature = None;
        for (name, value) in parsed.query_pairs() {
            match name.as_ref() {
                "expires" => expires = value.parse::<i64>().ok(),
                "signature" => signature = Some(value.into_owned()),
                _ => {}
            }
        }

        let expires = expires.ok_or_else(|| anyhow!("missing expiry"))?;
        let signature = signature.ok_or_else(|| anyhow!("missing signature"))?;

        if signature != self.sign(&key, expires) {
            return Err(anyhow!("signature mismatch"));
        }
        if now.timestamp() >= expires {
            return Err(anyhow!("URL expired"));
        }

        self.blobs
            .get(&key)
            .map(|b| b.data.clone())
            .ok_or_else(|| anyhow!("NoSuchKey: {}", key))
    }

    fn sign(&self, key: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.signing_key.as_bytes());
        hasher.update(b"\n");
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
        hasher.update(expires.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.blobs.insert(
            key.to_string(),
            StoredBlob {
                data,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.blobs
            .get(key)
            .map(|b| b.data.clone())
            .ok_or_else(|| anyhow!("NoSuchKey: {}", key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.blobs.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.blobs.contains_key(key))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobInfo>> {
        Ok(self
            .blobs
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| BlobInfo {
                key: entry.key().clone(),
                size: entry.data.len() as i64,
                last_modified: Some(entry.last_modified),
            })
            .collect())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String> {
        let expires = Utc::now().timestamp() + expires_in.as_secs() as i64;
        Ok(format!(
            "memory://blobs/{}?expires={}&signature={}",
            utf8_percent_encode(key, NON_ALPHANUMERIC),
            expires,
            self.sign(key, expires)
        ))
    }
}
