//! LayerStore trait — persistence for one memory record per user.
//!
//! Semantics the engine relies on:
//! - `get` returns an empty record (not an error) for unknown users, so
//!   records are created lazily on the first write.
//! - `upsert` applies every field in the patch atomically or none of them;
//!   readers never observe a half-applied patch.
//!
//! Implementations: SQLite, in-memory (for testing).

use crate::error::StoreError;
use crate::record::{MemoryRecord, RecordPatch};
use async_trait::async_trait;

/// The core LayerStore trait.
#[async_trait]
pub trait LayerStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Fetch the record for a user. Unknown users get an empty record.
    async fn get(&self, user_id: &str) -> std::result::Result<MemoryRecord, StoreError>;

    /// Merge the given fields into the user's record, creating it if absent,
    /// and refresh `updated_at`. All provided fields apply or none do.
    async fn upsert(
        &self,
        user_id: &str,
        patch: RecordPatch,
    ) -> std::result::Result<(), StoreError>;
}
