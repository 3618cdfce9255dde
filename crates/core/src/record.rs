//! The per-user memory record and its partial-update patch.

use crate::layer::Layer;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Mention counts keyed by fact string. Insertion-ordered so the promotion
/// scan is deterministic and no fact is starved.
pub type FactFrequency = IndexMap<String, u32>;

/// The persisted memory profile for one user: layers L2–L5 plus the
/// fact-frequency map. Created lazily on the first write; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// The user this record belongs to.
    pub user_id: String,

    /// L2 — rolling summary of recent sessions (soft budget 500 words).
    #[serde(default)]
    pub session_context: String,

    /// L3 — weekly behavioral patterns (soft budget 300 words).
    #[serde(default)]
    pub weekly_patterns: String,

    /// L4 — stable personal facts (soft budget 500 words).
    #[serde(default)]
    pub personal_profile: String,

    /// L5 — major life events (soft budget 200 words).
    #[serde(default)]
    pub life_milestones: String,

    /// Mention counts for facts not yet promoted into L4.
    #[serde(default)]
    pub fact_frequency: FactFrequency,

    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// An empty record for a user with no writes yet.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_context: String::new(),
            weekly_patterns: String::new(),
            personal_profile: String::new(),
            life_milestones: String::new(),
            fact_frequency: FactFrequency::new(),
            updated_at: Utc::now(),
        }
    }

    /// The text of a persisted layer. `None` for the working layer.
    pub fn layer_text(&self, layer: Layer) -> Option<&str> {
        match layer {
            Layer::Working => None,
            Layer::SessionContext => Some(&self.session_context),
            Layer::WeeklyPatterns => Some(&self.weekly_patterns),
            Layer::PersonalProfile => Some(&self.personal_profile),
            Layer::LifeMilestones => Some(&self.life_milestones),
        }
    }

    /// True when no layer holds text and no facts are tracked.
    pub fn is_empty(&self) -> bool {
        self.session_context.is_empty()
            && self.weekly_patterns.is_empty()
            && self.personal_profile.is_empty()
            && self.life_milestones.is_empty()
            && self.fact_frequency.is_empty()
    }
}

/// A partial update to a [`MemoryRecord`]. Only the fields set here are
/// written; an upsert applies all of them atomically or none of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_patterns: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_milestones: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_frequency: Option<FactFrequency>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content of a persisted layer. Panics on `Layer::Working`,
    /// which has no persisted column.
    pub fn with_layer(mut self, layer: Layer, content: impl Into<String>) -> Self {
        let content = content.into();
        match layer {
            Layer::Working => panic!("the working layer is never persisted"),
            Layer::SessionContext => self.session_context = Some(content),
            Layer::WeeklyPatterns => self.weekly_patterns = Some(content),
            Layer::PersonalProfile => self.personal_profile = Some(content),
            Layer::LifeMilestones => self.life_milestones = Some(content),
        }
        self
    }

    /// Replace the whole fact-frequency map.
    pub fn with_facts(mut self, facts: FactFrequency) -> Self {
        self.fact_frequency = Some(facts);
        self
    }

    /// True when the patch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.session_context.is_none()
            && self.weekly_patterns.is_none()
            && self.personal_profile.is_none()
            && self.life_milestones.is_none()
            && self.fact_frequency.is_none()
    }

    /// Merge this patch into a record, refreshing `updated_at`.
    /// Store implementations use this to apply the whole patch as one unit.
    pub fn apply_to(&self, record: &mut MemoryRecord) {
        if let Some(text) = &self.session_context {
            record.session_context = text.clone();
        }
        if let Some(text) = &self.weekly_patterns {
            record.weekly_patterns = text.clone();
        }
        if let Some(text) = &self.personal_profile {
            record.personal_profile = text.clone();
        }
        if let Some(text) = &self.life_milestones {
            record.life_milestones = text.clone();
        }
        if let Some(facts) = &self.fact_frequency {
            record.fact_frequency = facts.clone();
        }
        record.updated_at = Utc::now();
    }
}
