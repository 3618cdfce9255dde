//! Prompt templates for the summarization-service calls.
//!
//! The service honors these on a best-effort basis only; nothing downstream
//! assumes the markers or word counts actually came back as instructed.

use strata_core::ExtractionCategory;

/// Fixed instruction for the significance classifier. The reply is parsed
/// case-insensitively for a leading "YES".
pub const SIGNIFICANCE_PROMPT: &str = "You classify session summaries. Does the summary describe a major life event \
     for the user: graduation, new job, marriage, birth, loss, major move, or a \
     big achievement? Reply YES or NO only.";

/// Instruction for the communication-style analysis call.
pub const STYLE_PROMPT: &str = "You characterize how a user communicates, based on recent conversation \
     transcripts. Describe their formality, preferred response length, humor \
     tolerance, decision-making style, emotional openness, and which topics \
     energize them versus which they avoid. Reply with the description only, \
     no preamble, at most 100 words.";

/// System prompt for a layer merge.
pub fn merge_system(budget_words: usize, categories: &[ExtractionCategory]) -> String {
    let mut hints = String::new();
    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            hints.push_str("; ");
        }
        hints.push_str(category.prompt_hint());
    }

    format!(
        "You maintain one section of a user's long-term memory profile. Merge every \
         fact from the NEW MATERIAL relevant to these categories into the CURRENT \
         TEXT: {hints}. Mark newly discovered facts with [NEW] and changed facts \
         with [UPDATED]. Keep the full result under {budget_words} words. Reply \
         with the complete replacement text only."
    )
}

/// User message for a layer merge: the current text plus the new material.
pub fn merge_material(existing: &str, material: &str) -> String {
    let existing = if existing.trim().is_empty() {
        "(empty)"
    } else {
        existing
    };
    format!("CURRENT TEXT:\n{existing}\n\nNEW MATERIAL:\n{material}")
}

/// One combined merge instruction for several promoted facts.
pub fn promotion_material(facts: &[String]) -> String {
    let mut lines = String::from("The user has repeatedly mentioned:\n");
    for fact in facts {
        lines.push_str("- ");
        lines.push_str(fact);
        lines.push('\n');
    }
    lines
}

/// User message for the style analysis: the recent transcripts, newest last.
pub fn style_material(transcripts: &[String]) -> String {
    transcripts.join("\n---\n")
}
