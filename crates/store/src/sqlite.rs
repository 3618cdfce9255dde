//! SQLite backend — one row per user in a `memory_records` table.
//!
//! The partial upsert is a single `INSERT .. ON CONFLICT DO UPDATE`
//! statement with COALESCE over the optional fields, so a patch applies
//! atomically: readers see either the whole patch or none of it. The
//! fact-frequency map is stored as one JSON column and replaced wholesale,
//! which keeps the statement single-row and atomic.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use strata_core::{FactFrequency, LayerStore, MemoryRecord, RecordPatch, StoreError};
use tracing::{debug, info};

/// A production SQLite layer store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store from a file path.
    ///
    /// The database and table are created automatically.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite layer store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memory_records (
                user_id          TEXT PRIMARY KEY,
                session_context  TEXT NOT NULL DEFAULT '',
                weekly_patterns  TEXT NOT NULL DEFAULT '',
                personal_profile TEXT NOT NULL DEFAULT '',
                life_milestones  TEXT NOT NULL DEFAULT '',
                fact_frequency   TEXT NOT NULL DEFAULT '{}',
                updated_at       TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("memory_records table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<MemoryRecord, StoreError> {
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| StoreError::QueryFailed(format!("user_id column: {e}")))?;
        let session_context: String = row
            .try_get("session_context")
            .map_err(|e| StoreError::QueryFailed(format!("session_context column: {e}")))?;
        let weekly_patterns: String = row
            .try_get("weekly_patterns")
            .map_err(|e| StoreError::QueryFailed(format!("weekly_patterns column: {e}")))?;
        let personal_profile: String = row
            .try_get("personal_profile")
            .map_err(|e| StoreError::QueryFailed(format!("personal_profile column: {e}")))?;
        let life_milestones: String = row
            .try_get("life_milestones")
            .map_err(|e| StoreError::QueryFailed(format!("life_milestones column: {e}")))?;
        let facts_json: String = row
            .try_get("fact_frequency")
            .map_err(|e| StoreError::QueryFailed(format!("fact_frequency column: {e}")))?;
        let updated_at_str: String = row
            .try_get("updated_at")
            .map_err(|e| StoreError::QueryFailed(format!("updated_at column: {e}")))?;

        let fact_frequency: FactFrequency = serde_json::from_str(&facts_json)
            .map_err(|e| StoreError::Serialization(format!("fact_frequency: {e}")))?;

        let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(MemoryRecord {
            user_id,
            session_context,
            weekly_patterns,
            personal_profile,
            life_milestones,
            fact_frequency,
            updated_at,
        })
    }
}

#[async_trait]
impl LayerStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, user_id: &str) -> Result<MemoryRecord, StoreError> {
        let row = sqlx::query("SELECT * FROM memory_records WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("get: {e}")))?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => Ok(MemoryRecord::empty(user_id)),
        }
    }

    async fn upsert(&self, user_id: &str, patch: RecordPatch) -> Result<(), StoreError> {
        let facts_json = match &patch.fact_frequency {
            Some(facts) => Some(
                serde_json::to_string(facts)
                    .map_err(|e| StoreError::Serialization(format!("fact_frequency: {e}")))?,
            ),
            None => None,
        };
        let updated_at = Utc::now().to_rfc3339();

        // Single statement: the whole patch lands atomically or not at all.
        sqlx::query(
            r#"
            INSERT INTO memory_records
                (user_id, session_context, weekly_patterns, personal_profile,
                 life_milestones, fact_frequency, updated_at)
            VALUES
                (?1, COALESCE(?2, ''), COALESCE(?3, ''), COALESCE(?4, ''),
                 COALESCE(?5, ''), COALESCE(?6, '{}'), ?7)
            ON CONFLICT(user_id) DO UPDATE SET
                session_context  = COALESCE(?2, session_context),
                weekly_patterns  = COALESCE(?3, weekly_patterns),
                personal_profile = COALESCE(?4, personal_profile),
                life_milestones  = COALESCE(?5, life_milestones),
                fact_frequency   = COALESCE(?6, fact_frequency),
                updated_at       = ?7
            "#,
        )
        .bind(user_id)
        .bind(&patch.session_context)
        .bind(&patch.weekly_patterns)
        .bind(&patch.personal_profile)
        .bind(&patch.life_milestones)
        .bind(&facts_json)
        .bind(&updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("upsert: {e}")))?;

        Ok(())
    }
}
