use crate::api::error::AppError;
use crate::services::identity::Identity;

use super::{FileService, store_error};

impl FileService {
    /// Admin only. The role check runs before any lookup, so a non-admin gets
    /// Forbidden whether or not `file_id` exists.
    pub async fn delete(&self, caller: &Identity, file_id: &str) -> Result<(), AppError> {
        self.authorize_delete(caller)?;

        if file_id.is_empty() {
            return Err(AppError::BadRequest("fileId is required".to_string()));
        }

        let record = self
            .metadata
            .get(file_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        self.blobs
            .delete(&record.storage_key)
            .await
            .map_err(store_error)?;
        tracing::info!("🗑️ Deleted from blob store: {}", record.storage_key);

        // A failure here leaves a record whose blob is gone
        self.metadata.delete(file_id).await.map_err(|e| {
            tracing::error!(
                "❌ Blob {} deleted but record {} remains: {}",
                record.storage_key,
                file_id,
                e
            );
            store_error(e)
        })?;
        tracing::info!("🗑️ Deleted metadata: {} by {}", file_id, caller.id);

        Ok(())
    }
}
