//! Mention counting and threshold-based promotion selection.
//!
//! Facts arrive as opaque strings from the caller's extraction step. Each
//! session-end increments the mention count; once a fact reaches the
//! promotion threshold it is due for merging into the personal profile.
//! Scanning follows the map's insertion order so no fact is starved and the
//! pass is deterministic.

use strata_core::FactFrequency;
use tracing::debug;

/// Counts repeated fact mentions and selects facts due for promotion.
pub struct FrequencyTracker {
    threshold: u32,
}

impl FrequencyTracker {
    /// Create a tracker with the given promotion threshold (mentions).
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Increment each detected fact by one mention, inserting at 1 when
    /// absent. Blank strings are ignored. Returns how many were recorded.
    pub fn record_mentions(&self, facts: &mut FactFrequency, detected: &[String]) -> usize {
        let mut recorded = 0;
        for fact in detected {
            let fact = fact.trim();
            if fact.is_empty() {
                continue;
            }
            *facts.entry(fact.to_string()).or_insert(0) += 1;
            recorded += 1;
        }
        if recorded > 0 {
            debug!(recorded, total_tracked = facts.len(), "Fact mentions recorded");
        }
        recorded
    }

    /// Facts whose count has reached the threshold, in insertion order.
    pub fn promotable(&self, facts: &FactFrequency) -> Vec<String> {
        facts
            .iter()
            .filter(|(_, count)| **count >= self.threshold)
            .map(|(fact, _)| fact.clone())
            .collect()
    }

    /// Remove promoted facts from the map, preserving the insertion order
    /// of the remaining entries.
    pub fn remove_promoted(&self, facts: &mut FactFrequency, promoted: &[String]) {
        for fact in promoted {
            facts.shift_remove(fact);
        }
    }
}
