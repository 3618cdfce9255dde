//! `strata promote` — Merge a fact into a longer-lived layer.
//!
//! Calls the summarization service, so the configured provider must be
//! reachable. Leaves the fact-frequency map untouched.

use strata_config::AppConfig;

pub async fn run(user_id: &str, fact: &str, layer: u8) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let engine = super::open_engine(&config).await?;

    engine.promote(user_id, fact, layer).await?;

    println!("⬆️  Merged into L{layer} for {user_id}");
    Ok(())
}
