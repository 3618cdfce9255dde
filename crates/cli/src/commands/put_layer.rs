//! `strata put-layer` — Overwrite a layer directly.
//!
//! The administrative curation path: writes straight to the store with no
//! summarizer involvement.

use strata_config::AppConfig;
use strata_core::{Layer, RecordPatch, ValidationError};

pub async fn run(
    user_id: &str,
    layer_num: u8,
    content: String,
) -> Result<(), Box<dyn std::error::Error>> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::EmptyUserId.into());
    }
    let layer = Layer::from_number(layer_num)
        .filter(|l| l.is_persisted())
        .ok_or(ValidationError::LayerOutOfRange {
            layer: layer_num,
            allowed: "2-5",
        })?;

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = super::open_store(&config).await?;
    store
        .upsert(user_id, RecordPatch::new().with_layer(layer, content))
        .await?;

    println!("✏️  {layer} overwritten for {user_id}");
    Ok(())
}
