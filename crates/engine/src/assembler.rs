//! Context assembly — the block injected ahead of a conversation turn.
//!
//! Deterministic: identical records always produce identical output. Layers
//! appear in fixed priority order (Profile → Milestones → Patterns →
//! Recent), each prefixed with its bracketed label; empty layers are
//! skipped entirely. No length capping happens here — the caller owns any
//! further truncation against its own prompt budget.

use strata_core::{Layer, MemoryRecord};

/// The context assembler. Stateless — create one and reuse it.
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Concatenate the non-empty layers in priority order.
    pub fn build(&self, record: &MemoryRecord) -> String {
        let mut sections: Vec<String> = Vec::new();

        for layer in Layer::ASSEMBLY_ORDER {
            let Some(text) = record.layer_text(layer) else {
                continue;
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let label = layer
                .context_label()
                .expect("persisted layers always have a context label");
            sections.push(format!("{label}\n{text}"));
        }

        sections.join("\n\n")
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new()
    }
}
