use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::services::identity::Identity;
use crate::services::{blob_store::BlobStore, metadata_store::MetadataStore};
use std::sync::Arc;

pub mod delete;
pub mod query;
pub mod types;
pub mod upload;

pub use types::{DownloadLink, UploadRequest};

/// Upload, list, download and delete over a blob store and a metadata table.
///
/// The two stores are written without a spanning transaction. Upload writes the
/// blob first and removes it again if the metadata write fails; Delete removes
/// the blob before the record. Anything left behind by a failure in between is
/// picked up by [`crate::services::reconcile::Reconciler`].
pub struct FileService {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    config: AppConfig,
}

impl FileService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            blobs,
            metadata,
            config,
        }
    }

    /// Delete is the only privileged operation.
    pub fn authorize_delete(&self, caller: &Identity) -> Result<(), AppError> {
        if caller.has_role(&self.config.admin_role) {
            Ok(())
        } else {
            tracing::warn!(
                "⛔ Delete denied for {} (role: {})",
                caller.id,
                caller.role
            );
            Err(AppError::Forbidden("Access Denied: Admins Only".to_string()))
        }
    }
}

pub(crate) fn store_error(e: anyhow::Error) -> AppError {
    AppError::Internal(e.to_string())
}
