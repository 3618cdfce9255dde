//! In-memory backend — useful for testing and ephemeral deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{LayerStore, MemoryRecord, RecordPatch, StoreError};
use tokio::sync::RwLock;

/// An in-memory store keyed by user id. Patches apply under a single write
/// lock, so readers never observe a half-applied upsert.
pub struct InMemoryStore {
    records: Arc<RwLock<HashMap<String, MemoryRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LayerStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, user_id: &str) -> Result<MemoryRecord, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| MemoryRecord::empty(user_id)))
    }

    async fn upsert(&self, user_id: &str, patch: RecordPatch) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(user_id.to_string())
            .or_insert_with(|| MemoryRecord::empty(user_id));
        patch.apply_to(record);
        Ok(())
    }
}
