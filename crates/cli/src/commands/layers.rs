//! `strata layers` — Show a user's memory layers.

use strata_config::AppConfig;
use strata_engine::LayerDescriptor;

pub async fn run(user_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = super::open_store(&config).await?;
    let record = store.get(user_id).await?;

    println!("🧠 Memory layers for {user_id}");
    println!("   Updated: {}", record.updated_at.to_rfc3339());
    println!();

    for layer in LayerDescriptor::all_from(&record) {
        let budget = layer
            .word_budget
            .map(|b| format!("{b} words"))
            .unwrap_or_else(|| "no budget".into());
        println!("  L{} {} ({budget})", layer.number, layer.name);
        if layer.content.is_empty() {
            println!("      (empty)");
        } else {
            for line in layer.content.lines() {
                println!("      {line}");
            }
        }
    }

    if !record.fact_frequency.is_empty() {
        println!();
        println!(
            "  Tracked facts (promotion at {} mentions):",
            config.engine.promotion_threshold
        );
        for (fact, count) in &record.fact_frequency {
            println!("      {count}x {fact}");
        }
    }

    Ok(())
}
