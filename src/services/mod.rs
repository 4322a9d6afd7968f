pub mod blob_store;
pub mod file_service;
pub mod identity;
pub mod metadata_store;
pub mod reconcile;
pub mod worker;
