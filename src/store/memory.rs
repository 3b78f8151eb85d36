//! In-memory alert store

use async_trait::async_trait;
use dashmap::DashMap;

use super::{AlertStore, StoreError};
use crate::alerts::{AlertRecord, AlertStatus};

/// Alert store backed by a concurrent map. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, AlertRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn find_all(&self, status: AlertStatus) -> Result<Vec<AlertRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.status == status)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<AlertRecord>, StoreError> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, record: &AlertRecord) -> Result<(), StoreError> {
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.records.remove(id).is_some())
    }
}
