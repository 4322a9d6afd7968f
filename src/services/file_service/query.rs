use crate::api::error::AppError;
use crate::models::FileRecord;
use crate::services::identity::Identity;
use crate::services::metadata_store::ScanFilter;
use chrono::Utc;
use std::time::Duration;

use super::{FileService, store_error, types::DownloadLink};

impl FileService {
    /// Every record in the table, unpaginated and unfiltered: any authenticated
    /// caller sees every file regardless of owner.
    pub async fn list(&self, caller: &Identity) -> Result<Vec<FileRecord>, AppError> {
        let files = self.metadata.scan(None).await.map_err(store_error)?;
        tracing::debug!("Files found for {}: {}", caller.id, files.len());
        Ok(files)
    }

    /// Resolves `file_name` to the first record the scan yields. Names are not
    /// unique and there is no tiebreak, so with duplicates the chosen record
    /// depends on the store's scan order.
    pub async fn download(
        &self,
        caller: &Identity,
        file_name: &str,
    ) -> Result<DownloadLink, AppError> {
        if file_name.is_empty() {
            return Err(AppError::BadRequest("fileName is required".to_string()));
        }

        let record = self
            .metadata
            .scan(Some(ScanFilter::FileName(file_name)))
            .await
            .map_err(store_error)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let ttl = self.config.download_url_ttl_secs;
        let download_url = self
            .blobs
            .presign_get(&record.storage_key, Duration::from_secs(ttl))
            .await
            .map_err(|e| {
                tracing::error!("Failed to generate presigned URL: {}", e);
                store_error(e)
            })?;

        tracing::info!(
            "📎 Generated download URL for {} (requested by {})",
            record.storage_key,
            caller.id
        );

        Ok(DownloadLink {
            download_url,
            file_name: record.file_name,
            content_type: record.content_type,
            expires_at: Utc::now() + chrono::Duration::seconds(ttl as i64),
        })
    }
}
