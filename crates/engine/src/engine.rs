//! The per-user-serialized memory orchestrator.
//!
//! All writes for a user (session end, promotion, direct edits, style
//! writes) serialize on a striped per-user async mutex; different users
//! proceed in parallel. Reads for context assembly skip the lock — stale by
//! one write is acceptable, and the store contract guarantees they never see
//! a half-applied upsert.
//!
//! A session end runs four sub-steps that succeed or fail independently and
//! are reported distinctly in the [`SessionReport`]: the recent-context
//! merge, the frequency increments, the frequency promotion scan, and the
//! significance check. Resubmitting the same session summary after a
//! timeout can duplicate content in the free-text layers; the merge is a
//! full-text replacement guided by an imperfect model and carries no
//! idempotency key.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{
    Error, ExtractionCategory, Layer, LayerStore, MemoryRecord, RecordPatch, Summarizer,
    ValidationError,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::assembler::ContextAssembler;
use crate::fields;
use crate::frequency::FrequencyTracker;
use crate::merge::MergeEngine;
use crate::prompts;
use crate::significance::SignificanceDetector;
use crate::style::CommunicationStyleAnalyzer;

/// Mention count at which a fact is promoted into the personal profile.
pub const PROMOTION_THRESHOLD: u32 = 3;

/// Marker field the style analyzer writes into the personal profile.
pub const COMMUNICATION_STYLE_FIELD: &str = "communication_style";

/// Idle per-user locks are evicted once the map grows past this.
const MAX_IDLE_LOCKS: usize = 10_000;

/// Per-step outcome of one session-end pass. Partial success is expected;
/// callers see exactly which sub-steps applied.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    /// Whether the recent-context layer was updated.
    pub context_merged: bool,
    /// Merge failure detail when the recent-context update didn't apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_error: Option<String>,

    /// How many detected facts had their mention count incremented.
    pub facts_recorded: usize,

    /// Facts folded into the personal profile this pass.
    pub promoted_facts: Vec<String>,
    /// Merge failure detail when promotion didn't apply (counts are kept
    /// for retry at a later session end).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_error: Option<String>,

    /// Whether the summary was classified significant and folded into the
    /// milestones layer.
    pub milestone_recorded: bool,
    /// Classification or merge failure detail for the milestones path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub significance_error: Option<String>,
}

/// One entry of the external layer listing, including the L1 stub.
#[derive(Debug, Clone, Serialize)]
pub struct LayerDescriptor {
    pub number: u8,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_budget: Option<usize>,
    pub content: String,
}

impl LayerDescriptor {
    /// All five layers for a record. L1 is a fixed stub — it only ever
    /// lives inside a single conversation and is never persisted.
    pub fn all_from(record: &MemoryRecord) -> Vec<LayerDescriptor> {
        let mut layers = vec![LayerDescriptor {
            number: 1,
            name: Layer::Working.display_name(),
            word_budget: None,
            content: "ephemeral, session-only".into(),
        }];
        for layer in Layer::PERSISTED {
            layers.push(LayerDescriptor {
                number: layer.number(),
                name: layer.display_name(),
                word_budget: layer.word_budget(),
                content: record
                    .layer_text(layer)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        layers
    }
}

/// The tiered-memory orchestrator.
pub struct MemoryEngine {
    store: Arc<dyn LayerStore>,
    merger: MergeEngine,
    detector: SignificanceDetector,
    style: CommunicationStyleAnalyzer,
    tracker: FrequencyTracker,
    assembler: ContextAssembler,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MemoryEngine {
    /// Create an engine with default settings (threshold 3, 1.5× clip).
    pub fn new(store: Arc<dyn LayerStore>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            store,
            merger: MergeEngine::new(summarizer.clone()),
            detector: SignificanceDetector::new(summarizer.clone()),
            style: CommunicationStyleAnalyzer::new(summarizer),
            tracker: FrequencyTracker::new(PROMOTION_THRESHOLD),
            assembler: ContextAssembler::new(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create an engine from configuration.
    pub fn from_config(
        config: &strata_config::EngineConfig,
        store: Arc<dyn LayerStore>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            store,
            merger: MergeEngine::new(summarizer.clone())
                .with_hard_clip_factor(config.hard_clip_factor),
            detector: SignificanceDetector::new(summarizer.clone()),
            style: CommunicationStyleAnalyzer::new(summarizer)
                .with_transcript_cap(config.style_transcript_cap),
            tracker: FrequencyTracker::new(config.promotion_threshold),
            assembler: ContextAssembler::new(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Override the promotion threshold.
    pub fn with_promotion_threshold(mut self, threshold: u32) -> Self {
        self.tracker = FrequencyTracker::new(threshold.max(1));
        self
    }

    /// The lock serializing writes for one user. Idle locks are evicted
    /// when the map grows large.
    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        if locks.len() > MAX_IDLE_LOCKS {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks.entry(user_id.to_string()).or_default().clone()
    }

    fn validate_user(user_id: &str) -> Result<(), ValidationError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        Ok(())
    }

    fn budget(layer: Layer) -> usize {
        layer
            .word_budget()
            .expect("persisted layers always carry a word budget")
    }

    /// Process a completed session: merge the summary into the recent
    /// context, count detected facts, run the frequency promotion scan, and
    /// run the significance check.
    pub async fn session_end(
        &self,
        user_id: &str,
        session_summary: &str,
        detected_facts: &[String],
    ) -> Result<SessionReport, Error> {
        Self::validate_user(user_id)?;
        if session_summary.trim().is_empty() {
            return Err(ValidationError::MissingSessionSummary.into());
        }

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let record = self.store.get(user_id).await?;
        let mut report = SessionReport::default();
        let mut patch = RecordPatch::new();

        // Step 1: fold the summary into the recent-context layer. Failure
        // leaves the layer unchanged and does not stop the pass.
        match self
            .merger
            .merge(
                &record.session_context,
                session_summary,
                Self::budget(Layer::SessionContext),
                &ExtractionCategory::ALL,
            )
            .await
        {
            Ok(updated) => {
                patch.session_context = Some(updated);
                report.context_merged = true;
            }
            Err(e) => {
                warn!(user = user_id, error = %e, "Recent-context merge failed");
                report.context_error = Some(e.to_string());
            }
        }

        // Step 2: frequency increments are local and always apply.
        let mut facts = record.fact_frequency.clone();
        report.facts_recorded = self.tracker.record_mentions(&mut facts, detected_facts);

        // Step 3: promotion scan against the updated counts, in insertion
        // order, merged as one combined call. On failure every count is
        // kept for retry at a later session end.
        let due = self.tracker.promotable(&facts);
        if !due.is_empty() {
            match self
                .merger
                .merge(
                    &record.personal_profile,
                    &prompts::promotion_material(&due),
                    Self::budget(Layer::PersonalProfile),
                    &ExtractionCategory::ALL,
                )
                .await
            {
                Ok(profile) => {
                    patch.personal_profile = Some(profile);
                    self.tracker.remove_promoted(&mut facts, &due);
                    info!(user = user_id, count = due.len(), "Facts promoted to profile");
                    report.promoted_facts = due;
                }
                Err(e) => {
                    warn!(user = user_id, error = %e, "Fact promotion failed, counts kept");
                    report.promotion_error = Some(e.to_string());
                }
            }
        }

        patch.fact_frequency = Some(facts);

        // One atomic upsert for steps 1–3. Store failure aborts the whole
        // operation — no partial column writes.
        self.store.upsert(user_id, patch).await?;

        // Step 4: significance check, after the recent-context update has
        // been persisted. A failure here can't undo the applied steps.
        match self.detector.is_significant(session_summary).await {
            Ok(true) => {
                let current = self.store.get(user_id).await?;
                match self
                    .merger
                    .merge(
                        &current.life_milestones,
                        session_summary,
                        Self::budget(Layer::LifeMilestones),
                        &ExtractionCategory::ALL,
                    )
                    .await
                {
                    Ok(milestones) => {
                        self.store
                            .upsert(
                                user_id,
                                RecordPatch::new().with_layer(Layer::LifeMilestones, milestones),
                            )
                            .await?;
                        report.milestone_recorded = true;
                        info!(user = user_id, "Milestone recorded");
                    }
                    Err(e) => {
                        warn!(user = user_id, error = %e, "Milestone merge failed");
                        report.significance_error = Some(e.to_string());
                    }
                }
            }
            Ok(false) => {}
            Err(e) => {
                warn!(user = user_id, error = %e, "Significance check failed");
                report.significance_error = Some(e.to_string());
            }
        }

        Ok(report)
    }

    /// Merge a fact directly into a target layer (3–5). Leaves the
    /// fact-frequency map untouched.
    pub async fn promote(&self, user_id: &str, fact: &str, target_layer: u8) -> Result<(), Error> {
        Self::validate_user(user_id)?;
        if fact.trim().is_empty() {
            return Err(ValidationError::EmptyFact.into());
        }
        let layer = Layer::from_number(target_layer)
            .filter(|l| (3..=5).contains(&l.number()))
            .ok_or(ValidationError::LayerOutOfRange {
                layer: target_layer,
                allowed: "3-5",
            })?;

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let record = self.store.get(user_id).await?;
        let existing = record.layer_text(layer).unwrap_or_default();
        let merged = self
            .merger
            .merge(existing, fact, Self::budget(layer), &ExtractionCategory::ALL)
            .await?;

        self.store
            .upsert(user_id, RecordPatch::new().with_layer(layer, merged))
            .await?;
        info!(user = user_id, layer = %layer, "Manual promotion applied");
        Ok(())
    }

    /// Overwrite a layer (2–5) directly, bypassing the merge engine.
    /// Administrative/manual-curation path; no LLM involvement.
    pub async fn put_layer(
        &self,
        user_id: &str,
        layer_num: u8,
        content: String,
    ) -> Result<(), Error> {
        Self::validate_user(user_id)?;
        let layer = Layer::from_number(layer_num)
            .filter(|l| l.is_persisted())
            .ok_or(ValidationError::LayerOutOfRange {
                layer: layer_num,
                allowed: "2-5",
            })?;

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        self.store
            .upsert(user_id, RecordPatch::new().with_layer(layer, content))
            .await?;
        info!(user = user_id, layer = %layer, "Layer overwritten");
        Ok(())
    }

    /// All five layers for a user, including the L1 stub entry.
    pub async fn layers(&self, user_id: &str) -> Result<Vec<LayerDescriptor>, Error> {
        Self::validate_user(user_id)?;
        let record = self.store.get(user_id).await?;
        Ok(LayerDescriptor::all_from(&record))
    }

    /// The raw record (read path, no lock).
    pub async fn record(&self, user_id: &str) -> Result<MemoryRecord, Error> {
        Self::validate_user(user_id)?;
        Ok(self.store.get(user_id).await?)
    }

    /// The assembled context block for the next conversation turn.
    /// Read-only; does not take the per-user write lock.
    pub async fn build_context(&self, user_id: &str) -> Result<String, Error> {
        Self::validate_user(user_id)?;
        let record = self.store.get(user_id).await?;
        Ok(self.assembler.build(&record))
    }

    /// Characterize the user's communication style from recent transcripts
    /// and write it into the personal profile under
    /// `[communication_style]`. Invoked by an external scheduler.
    pub async fn analyze_style(
        &self,
        user_id: &str,
        transcripts: &[String],
    ) -> Result<String, Error> {
        Self::validate_user(user_id)?;
        if transcripts.iter().all(|t| t.trim().is_empty()) {
            return Err(ValidationError::EmptyTranscripts.into());
        }

        let description = self.style.analyze(transcripts).await?;

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let record = self.store.get(user_id).await?;
        let profile = fields::update_field(
            &record.personal_profile,
            COMMUNICATION_STYLE_FIELD,
            &description,
        );
        self.store
            .upsert(
                user_id,
                RecordPatch::new().with_layer(Layer::PersonalProfile, profile),
            )
            .await?;

        info!(user = user_id, "Communication style updated");
        Ok(description)
    }
}
