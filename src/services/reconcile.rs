use crate::config::AppConfig;
use crate::services::{blob_store::BlobStore, metadata_store::MetadataStore};
use anyhow::Result;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Blob keys with no metadata record
    pub orphaned_blobs: Vec<String>,
    /// File ids whose record points at a missing blob
    pub dangling_records: Vec<String>,
    pub repaired: usize,
    pub repair_failures: usize,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.orphaned_blobs.is_empty() && self.dangling_records.is_empty()
    }
}

/// Finds divergence between the blob store and the metadata table and,
/// when `repair` is set, removes the side that has no counterpart.
///
/// Entries younger than the grace period are skipped so an upload that has
/// written its blob but not yet its record is not mistaken for an orphan.
pub struct Reconciler {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    grace: Duration,
    repair: bool,
}

impl Reconciler {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            blobs,
            metadata,
            grace: Duration::seconds(config.reconcile_grace_secs),
            repair: config.reconcile_repair,
        }
    }

    pub async fn sweep(&self) -> Result<ReconcileReport> {
        let cutoff = Utc::now() - self.grace;

        // Records first: an upload racing this sweep then shows up as a young
        // blob, never as a dangling record.
        let records = self.metadata.scan(None).await?;
        let blobs = self.blobs.list("").await?;

        let referenced: HashSet<&str> = records.iter().map(|r| r.storage_key.as_str()).collect();
        let stored: HashSet<&str> = blobs.iter().map(|b| b.key.as_str()).collect();

        let mut report = ReconcileReport::default();

        for blob in &blobs {
            let old_enough = blob.last_modified.is_none_or(|t| t <= cutoff);
            if old_enough && !referenced.contains(blob.key.as_str()) {
                report.orphaned_blobs.push(blob.key.clone());
            }
        }

        for record in &records {
            if record.uploaded_at <= cutoff && !stored.contains(record.storage_key.as_str()) {
                report.dangling_records.push(record.file_id.clone());
            }
        }

        if self.repair {
            for key in &report.orphaned_blobs {
                match self.blobs.delete(key).await {
                    Ok(()) => report.repaired += 1,
                    Err(e) => {
                        tracing::error!("Failed to remove orphaned blob {}: {}", key, e);
                        report.repair_failures += 1;
                    }
                }
            }
            for file_id in &report.dangling_records {
                match self.metadata.delete(file_id).await {
                    Ok(()) => report.repaired += 1,
                    Err(e) => {
                        tracing::error!("Failed to remove dangling record {}: {}", file_id, e);
                        report.repair_failures += 1;
                    }
                }
            }
        }

        if report.is_consistent() {
            tracing::info!(
                "✅ Stores consistent ({} records, {} blobs)",
                records.len(),
                blobs.len()
            );
        } else {
            tracing::warn!(
                "⚠️ Found {} orphaned blobs and {} dangling records (repaired: {}, failed: {})",
                report.orphaned_blobs.len(),
                report.dangling_records.len(),
                report.repaired,
                report.repair_failures
            );
        }

        Ok(report)
    }
}
