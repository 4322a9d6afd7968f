use bytes::Bytes;
use chrono::{DateTime, Utc};

pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

pub struct DownloadLink {
    pub download_url: String,
    pub file_name: String,
    pub content_type: String,
    pub expires_at: DateTime<Utc>,
}
