//! The advisory extraction taxonomy injected into merge prompts.
//!
//! Categories bias what the summarization service pulls out of new material.
//! They are instructions only — nothing validates merged text against them.

use serde::{Deserialize, Serialize};

/// A category of user detail the merge prompt asks the summarizer to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionCategory {
    Identity,
    ImportantDates,
    RoutineSchedule,
    Preferences,
    HealthWellness,
    GoalsPassions,
    CurrentConcerns,
    RelationshipWithAssistant,
}

impl ExtractionCategory {
    /// The full fixed taxonomy, in prompt order.
    pub const ALL: [ExtractionCategory; 8] = [
        ExtractionCategory::Identity,
        ExtractionCategory::ImportantDates,
        ExtractionCategory::RoutineSchedule,
        ExtractionCategory::Preferences,
        ExtractionCategory::HealthWellness,
        ExtractionCategory::GoalsPassions,
        ExtractionCategory::CurrentConcerns,
        ExtractionCategory::RelationshipWithAssistant,
    ];

    /// The phrase used for this category inside prompt instructions.
    pub const fn prompt_hint(self) -> &'static str {
        match self {
            ExtractionCategory::Identity => "identity (name, age, occupation, family)",
            ExtractionCategory::ImportantDates => "important dates (birthdays, anniversaries)",
            ExtractionCategory::RoutineSchedule => "routine and schedule",
            ExtractionCategory::Preferences => "preferences (likes, dislikes)",
            ExtractionCategory::HealthWellness => "health and wellness",
            ExtractionCategory::GoalsPassions => "goals and passions",
            ExtractionCategory::CurrentConcerns => "current concerns",
            ExtractionCategory::RelationshipWithAssistant => {
                "relationship with the assistant (trust, tone, history)"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_is_fixed_at_eight() {
        assert_eq!(ExtractionCategory::ALL.len(), 8);
    }

    #[test]
    fn hints_are_distinct() {
        let hints: std::collections::HashSet<&str> = ExtractionCategory::ALL
            .iter()
            .map(|c| c.prompt_hint())
            .collect();
        assert_eq!(hints.len(), 8);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ExtractionCategory::HealthWellness).unwrap();
        assert_eq!(json, "\"health_wellness\"");
    }
}
