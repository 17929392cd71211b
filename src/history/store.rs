use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::history::models::HistoryRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Record {0} does not exist")]
    NotFound(String),

    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Namespaced persistence for history records. Writes are last-write-wins.
pub trait RecordStore: Send + Sync + 'static {
    fn get_all(&self) -> impl Future<Output = Result<Vec<HistoryRecord>, StoreError>> + Send;

    fn add(&self, record: &HistoryRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn remove(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Keeps serialized records in memory, keyed by `(namespace, id)`.
/// Clones share the same entries.
#[derive(Debug, Clone)]
pub struct MemoryRecordStore {
    namespace: String,
    entries: Arc<DashMap<(String, String), String>>,
}

impl MemoryRecordStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Another namespace over the same entries.
    pub fn with_namespace(&self, namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: self.entries.clone(),
        }
    }

    fn key(&self, id: &str) -> (String, String) {
        (self.namespace.clone(), id.to_string())
    }
}

impl RecordStore for MemoryRecordStore {
    async fn get_all(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        let mut records = Vec::new();
        for entry in self.entries.iter() {
            if entry.key().0 != self.namespace {
                continue;
            }

            records.push(serde_json::from_str::<HistoryRecord>(entry.value())?);
        }

        Ok(records)
    }

    async fn add(&self, record: &HistoryRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        self.entries.insert(self.key(&record.id), payload);
        debug!("Stored record {} in {}", record.id, self.namespace);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.entries
            .remove(&self.key(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
