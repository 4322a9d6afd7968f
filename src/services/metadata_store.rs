use crate::entities::{file_records, prelude::*};
use crate::models::FileRecord;
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::RwLock;

/// Equality predicate applied during a scan.
#[derive(Debug, Clone, Copy)]
pub enum ScanFilter<'a> {
    FileName(&'a str),
}

impl ScanFilter<'_> {
    fn matches(&self, record: &FileRecord) -> bool {
        match self {
            ScanFilter::FileName(name) => record.file_name == *name,
        }
    }
}

/// Key-value table of [`FileRecord`]s keyed by `file_id`.
///
/// Scan order is whatever the backing store yields; callers must not rely on it.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Inserts or replaces the record with the same `file_id`.
    async fn put(&self, record: &FileRecord) -> Result<()>;
    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>>;
    /// Deleting a missing id is not an error.
    async fn delete(&self, file_id: &str) -> Result<()>;
    async fn scan(&self, filter: Option<ScanFilter<'_>>) -> Result<Vec<FileRecord>>;

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

impl From<file_records::Model> for FileRecord {
    fn from(m: file_records::Model) -> Self {
        Self {
            file_id: m.file_id,
            file_name: m.file_name,
            storage_key: m.storage_key,
            content_type: m.content_type,
            size: m.size,
            owner_id: m.owner_id,
            owner_email: m.owner_email,
            owner_role: m.owner_role,
            uploaded_at: m.uploaded_at,
        }
    }
}

impl From<&FileRecord> for file_records::ActiveModel {
    fn from(r: &FileRecord) -> Self {
        Self {
            file_id: Set(r.file_id.clone()),
            file_name: Set(r.file_name.clone()),
            storage_key: Set(r.storage_key.clone()),
            content_type: Set(r.content_type.clone()),
            size: Set(r.size),
            owner_id: Set(r.owner_id.clone()),
            owner_email: Set(r.owner_email.clone()),
            owner_role: Set(r.owner_role.clone()),
            uploaded_at: Set(r.uploaded_at),
        }
    }
}

pub struct SeaOrmMetadataStore {
    db: DatabaseConnection,
}

impl SeaOrmMetadataStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for SeaOrmMetadataStore {
    async fn put(&self, record: &FileRecord) -> Result<()> {
        let active: file_records::ActiveModel = record.into();
        let exists = FileRecords::find_by_id(record.file_id.clone())
            .one(&self.db)
            .await?
            .is_some();

        if exists {
            active.update(&self.db).await?;
        } else {
            active.insert(&self.db).await?;
        }
        Ok(())
    }

    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>> {
        let model = FileRecords::find_by_id(file_id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(FileRecord::from))
    }

    async fn delete(&self, file_id: &str) -> Result<()> {
        FileRecords::delete_by_id(file_id.to_string())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn scan(&self, filter: Option<ScanFilter<'_>>) -> Result<Vec<FileRecord>> {
        let mut query = FileRecords::find();
        if let Some(ScanFilter::FileName(name)) = filter {
            query = query.filter(file_records::Column::FileName.eq(name));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(FileRecord::from).collect())
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await?;
        Ok(())
    }
}

/// Process-local table. Scans yield records in insertion order.
#[derive(Default)]
pub struct InMemoryMetadataStore {
    records: RwLock<Vec<FileRecord>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<FileRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<FileRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn put(&self, record: &FileRecord) -> Result<()> {
        let mut records = self.write();
        match records.iter_mut().find(|r| r.file_id == record.file_id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>> {
        Ok(self.read().iter().find(|r| r.file_id == file_id).cloned())
    }

    async fn delete(&self, file_id: &str) -> Result<()> {
        self.write().retain(|r| r.file_id != file_id);
        Ok(())
    }

    async fn scan(&self, filter: Option<ScanFilter<'_>>) -> Result<Vec<FileRecord>> {
        Ok(self
            .read()
            .iter()
            .filter(|r| filter.is_none_or(|f| f.matches(r)))
            .cloned()
            .collect())
    }
}
