//! JSON document store: one file per alert

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

use super::{AlertStore, StoreError};
use crate::alerts::{AlertRecord, AlertStatus};

/// Alert store keeping each record as `<id>.json` in a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `data_dir`
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the file path for a key
    fn key_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sanitize(id)))
    }

    async fn read_record(&self, path: &Path) -> Result<AlertRecord, StoreError> {
        let data = fs::read(path).await?;
        serde_json::from_slice(&data).map_err(|e| StoreError::Corrupted {
            id: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Keep ids usable as file names
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

#[async_trait]
impl AlertStore for JsonFileStore {
    async fn find_all(&self, status: AlertStatus) -> Result<Vec<AlertRecord>, StoreError> {
        let mut entries = fs::read_dir(&self.data_dir).await?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read_record(&path).await {
                Ok(record) if record.status == status => records.push(record),
                Ok(_) => {}
                // Deleted between listing and reading
                Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable alert document");
                }
            }
        }

        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<AlertRecord>, StoreError> {
        let path = self.key_path(id);
        match self.read_record(&path).await {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn upsert(&self, record: &AlertRecord) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let path = self.key_path(&record.id);
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.{}.{}.tmp", std::process::id(), seq));
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(alert_id = %record.id, status = %record.status, "Alert document written");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.key_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::FlightSnapshot;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(chat_id: i64, code: &str) -> AlertRecord {
        AlertRecord::queued(chat_id, code, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap())
    }

    #[tokio::test]
    async fn test_upsert_get_delete() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.data_dir(), dir.path());

        let alert = record(42, "LH1234");
        store.upsert(&alert).await.unwrap();
        assert_eq!(store.get(&alert.id).await.unwrap(), Some(alert.clone()));

        let active = alert.activated(FlightSnapshot::new("2c1f", "LH1234").with_status("Scheduled"));
        store.upsert(&active).await.unwrap();
        assert!(store.find_all(AlertStatus::Queued).await.unwrap().is_empty());
        assert_eq!(store.find_all(AlertStatus::Active).await.unwrap(), vec![active.clone()]);

        assert!(store.delete(&alert.id).await.unwrap());
        assert!(!store.delete(&alert.id).await.unwrap());
        assert_eq!(store.get(&alert.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = JsonFileStore::open(dir.path()).unwrap();
            store.upsert(&record(1, "BA276")).await.unwrap();
            store.upsert(&record(2, "BA277").frozen()).await.unwrap();
        }

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.count(AlertStatus::Queued).await.unwrap(), 1);
        assert_eq!(store.count(AlertStatus::Frozen).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_skips_corrupted_documents() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        store.upsert(&record(1, "BA276")).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let queued = store.find_all(AlertStatus::Queued).await.unwrap();
        assert_eq!(queued.len(), 1);
        assert!(matches!(
            store.get("broken").await,
            Err(StoreError::Corrupted { .. })
        ));
    }
}
