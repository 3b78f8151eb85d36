//! Alert persistence
//!
//! The sweepers only need three operations on the store: list one status
//! partition, insert-or-replace by id, and delete by id. Implementations must
//! make each of them atomic per key.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::alerts::{AlertRecord, AlertStatus};

/// Trait for alert stores
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// All records currently in `status`
    async fn find_all(&self, status: AlertStatus) -> Result<Vec<AlertRecord>, StoreError>;

    /// Fetch one record by id
    async fn get(&self, id: &str) -> Result<Option<AlertRecord>, StoreError>;

    /// Insert or replace by `record.id`
    async fn upsert(&self, record: &AlertRecord) -> Result<(), StoreError>;

    /// Remove by id. Returns whether a record was present.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Number of records in `status`
    async fn count(&self, status: AlertStatus) -> Result<usize, StoreError> {
        Ok(self.find_all(status).await?.len())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupted document {id}: {reason}")]
    Corrupted { id: String, reason: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
