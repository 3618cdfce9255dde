//! The five-tier layer model.
//!
//! Each layer retains information at a different time horizon under a soft
//! word budget:
//!
//! | # | Layer            | Horizon                  | Budget (words) |
//! |---|------------------|--------------------------|----------------|
//! | 1 | Working          | single live conversation | — (ephemeral)  |
//! | 2 | Session Context  | recent sessions          | 500            |
//! | 3 | Weekly Patterns  | behavioral patterns      | 300            |
//! | 4 | Personal Profile | stable personal facts    | 500            |
//! | 5 | Life Milestones  | major life events        | 200            |
//!
//! Layer 1 is never persisted and never merged — it exists only so the
//! external surface can describe the full tier model.

use serde::{Deserialize, Serialize};

/// One of the five fixed memory tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// L1 — ephemeral, session-only. Out of persistence scope.
    Working,
    /// L2 — rolling summary of recent sessions.
    SessionContext,
    /// L3 — weekly behavioral patterns.
    WeeklyPatterns,
    /// L4 — stable personal facts, including promoted repeated mentions.
    PersonalProfile,
    /// L5 — major life events.
    LifeMilestones,
}

impl Layer {
    /// The persisted layers, in storage order (L2..L5).
    pub const PERSISTED: [Layer; 4] = [
        Layer::SessionContext,
        Layer::WeeklyPatterns,
        Layer::PersonalProfile,
        Layer::LifeMilestones,
    ];

    /// Context assembly priority order: Profile → Milestones → Patterns → Recent.
    pub const ASSEMBLY_ORDER: [Layer; 4] = [
        Layer::PersonalProfile,
        Layer::LifeMilestones,
        Layer::WeeklyPatterns,
        Layer::SessionContext,
    ];

    /// The layer's numeric id (1–5).
    pub const fn number(self) -> u8 {
        match self {
            Layer::Working => 1,
            Layer::SessionContext => 2,
            Layer::WeeklyPatterns => 3,
            Layer::PersonalProfile => 4,
            Layer::LifeMilestones => 5,
        }
    }

    /// Resolve a layer from its numeric id.
    pub fn from_number(n: u8) -> Option<Layer> {
        match n {
            1 => Some(Layer::Working),
            2 => Some(Layer::SessionContext),
            3 => Some(Layer::WeeklyPatterns),
            4 => Some(Layer::PersonalProfile),
            5 => Some(Layer::LifeMilestones),
            _ => None,
        }
    }

    /// Soft word budget. `None` for the ephemeral working layer.
    pub const fn word_budget(self) -> Option<usize> {
        match self {
            Layer::Working => None,
            Layer::SessionContext => Some(500),
            Layer::WeeklyPatterns => Some(300),
            Layer::PersonalProfile => Some(500),
            Layer::LifeMilestones => Some(200),
        }
    }

    /// Human-readable name used in API responses.
    pub const fn display_name(self) -> &'static str {
        match self {
            Layer::Working => "Working",
            Layer::SessionContext => "Session Context",
            Layer::WeeklyPatterns => "Weekly Patterns",
            Layer::PersonalProfile => "Personal Profile",
            Layer::LifeMilestones => "Life Milestones",
        }
    }

    /// Bracketed label prefixing this layer's section in assembled context.
    /// `None` for the working layer, which never appears there.
    pub const fn context_label(self) -> Option<&'static str> {
        match self {
            Layer::Working => None,
            Layer::SessionContext => Some("[Recent]"),
            Layer::WeeklyPatterns => Some("[Patterns]"),
            Layer::PersonalProfile => Some("[Profile]"),
            Layer::LifeMilestones => Some("[Milestones]"),
        }
    }

    /// Whether this layer has a persisted text column.
    pub const fn is_persisted(self) -> bool {
        !matches!(self, Layer::Working)
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{} {}", self.number(), self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for n in 1..=5u8 {
            let layer = Layer::from_number(n).unwrap();
            assert_eq!(layer.number(), n);
        }
        assert!(Layer::from_number(0).is_none());
        assert!(Layer::from_number(6).is_none());
    }

    #[test]
    fn budgets_match_tier_model() {
        assert_eq!(Layer::Working.word_budget(), None);
        assert_eq!(Layer::SessionContext.word_budget(), Some(500));
        assert_eq!(Layer::WeeklyPatterns.word_budget(), Some(300));
        assert_eq!(Layer::PersonalProfile.word_budget(), Some(500));
        assert_eq!(Layer::LifeMilestones.word_budget(), Some(200));
    }

    #[test]
    fn assembly_order_is_profile_first() {
        assert_eq!(
            Layer::ASSEMBLY_ORDER,
            [
                Layer::PersonalProfile,
                Layer::LifeMilestones,
                Layer::WeeklyPatterns,
                Layer::SessionContext,
            ]
        );
    }

    #[test]
    fn only_working_is_ephemeral() {
        assert!(!Layer::Working.is_persisted());
        for layer in Layer::PERSISTED {
            assert!(layer.is_persisted());
            assert!(layer.context_label().is_some());
        }
        assert!(Layer::Working.context_label().is_none());
    }
}
