use crate::api::error::AppError;
use crate::models::{FileRecord, storage_key};
use crate::services::identity::Identity;
use chrono::Utc;
use uuid::Uuid;

use super::{FileService, store_error, types::UploadRequest};

impl FileService {
    /// Writes the blob, then the metadata record.
    ///
    /// An empty payload is stored as a zero-byte file.
    pub async fn upload(
        &self,
        owner: &Identity,
        req: UploadRequest,
    ) -> Result<FileRecord, AppError> {
        let file_id = Uuid::new_v4().to_string();
        let key = storage_key(&owner.id, &file_id, &req.file_name);
        let size = req.data.len() as i64;

        self.blobs
            .put(&key, req.data, &req.content_type)
            .await
            .map_err(|e| {
                tracing::error!("❌ Blob write failed for {}: {}", key, e);
                store_error(e)
            })?;
        tracing::info!("📦 File uploaded to blob store: {} ({} bytes)", key, size);

        let record = FileRecord {
            file_id,
            file_name: req.file_name,
            storage_key: key,
            content_type: req.content_type,
            size,
            owner_id: owner.id.clone(),
            owner_email: owner.email.clone(),
            owner_role: owner.role.clone(),
            uploaded_at: Utc::now(),
        };

        if let Err(e) = self.metadata.put(&record).await {
            tracing::error!(
                "❌ Metadata write failed for {}: {}",
                record.file_id,
                e
            );
            self.discard_orphan(&record.storage_key).await;
            return Err(store_error(e));
        }
        tracing::info!("📝 Metadata saved: {}", record.file_id);

        Ok(record)
    }

    /// Compensates a failed metadata write. If this fails too the blob stays
    /// orphaned until the next reconciliation sweep.
    async fn discard_orphan(&self, key: &str) {
        match self.blobs.delete(key).await {
            Ok(()) => tracing::info!("🧹 Removed orphaned blob {}", key),
            Err(e) => tracing::warn!(
                "⚠️ Could not remove orphaned blob {} ({}); leaving it for reconciliation",
                key,
                e
            ),
        }
    }
}
