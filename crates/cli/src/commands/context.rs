//! `strata context` — Print a user's assembled context block.
//!
//! Prints exactly what a caller would inject ahead of a conversation turn,
//! so the output stays pipe-friendly.

use strata_config::AppConfig;
use strata_engine::ContextAssembler;

pub async fn run(user_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = super::open_store(&config).await?;
    let record = store.get(user_id).await?;

    let context = ContextAssembler::new().build(&record);
    if context.is_empty() {
        eprintln!("(no stored memory for {user_id})");
    } else {
        println!("{context}");
    }

    Ok(())
}
