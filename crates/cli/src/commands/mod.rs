//! CLI command implementations.

pub mod context;
pub mod gateway;
pub mod layers;
pub mod promote;
pub mod put_layer;

use std::sync::Arc;
use strata_config::AppConfig;
use strata_core::LayerStore;
use strata_engine::MemoryEngine;

/// Open the configured layer store. Read-only commands and direct edits go
/// through this without touching the summarizer.
pub(crate) async fn open_store(
    config: &AppConfig,
) -> Result<Arc<dyn LayerStore>, Box<dyn std::error::Error>> {
    match config.store.backend.as_str() {
        "memory" => Ok(Arc::new(strata_store::InMemoryStore::new())),
        _ => {
            let path = config.sqlite_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Ok(Arc::new(
                strata_store::SqliteStore::new(&path.display().to_string()).await?,
            ))
        }
    }
}

/// Build the full engine (store plus summarizer) for commands that merge.
pub(crate) async fn open_engine(
    config: &AppConfig,
) -> Result<Arc<MemoryEngine>, Box<dyn std::error::Error>> {
    let store = open_store(config).await?;
    let summarizer = strata_summarizer::build_from_config(config)?;
    Ok(Arc::new(MemoryEngine::from_config(
        &config.engine,
        store,
        summarizer,
    )))
}
