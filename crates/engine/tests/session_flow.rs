//! End-to-end engine tests over the in-memory store and the scripted
//! summarizer.
//!
//! The scripted stub serves replies in FIFO order; a session end calls the
//! summarizer as: recent-context merge, promotion merge (only when facts are
//! due), significance check, milestone merge (only on YES). With an empty
//! queue the stub echoes merges and answers NO to the significance check.

use std::sync::Arc;
use strata_engine::MemoryEngine;
use strata_store::InMemoryStore;
use strata_summarizer::ScriptedSummarizer;

fn setup() -> (Arc<MemoryEngine>, Arc<ScriptedSummarizer>, Arc<InMemoryStore>) {
    let stub = Arc::new(ScriptedSummarizer::echoing());
    let store = Arc::new(InMemoryStore::new());
    let engine = Arc::new(MemoryEngine::new(store.clone(), stub.clone()));
    (engine, stub, store)
}

#[tokio::test]
async fn new_user_first_session() {
    // Scenario: first session-end for a fresh user
    let (engine, stub, _store) = setup();
    stub.push_reply("Recently talked about their dog Rex.");

    let report = engine
        .session_end(
            "u1",
            "mentioned dog named Rex",
            &["has dog named Rex".to_string()],
        )
        .await
        .unwrap();

    assert!(report.context_merged);
    assert_eq!(report.facts_recorded, 1);
    assert!(report.promoted_facts.is_empty());
    assert!(!report.milestone_recorded);

    let record = engine.record("u1").await.unwrap();
    assert_eq!(record.session_context, "Recently talked about their dog Rex.");
    assert_eq!(record.fact_frequency.get("has dog named Rex"), Some(&1));
    assert!(record.personal_profile.is_empty());
}

#[tokio::test]
async fn third_mention_promotes_into_profile() {
    let (engine, stub, _store) = setup();
    let fact = "has dog named Rex".to_string();

    // Two sessions below the threshold
    for i in 0..2 {
        stub.push_reply(format!("context after session {i}"));
        let report = engine
            .session_end("u1", "mentioned the dog again", std::slice::from_ref(&fact))
            .await
            .unwrap();
        assert!(report.promoted_facts.is_empty());
    }

    // Third mention crosses the threshold
    stub.push_reply("context after session 2");
    stub.push_reply("Stable facts: [NEW] has dog named Rex");
    let report = engine
        .session_end("u1", "mentioned the dog again", std::slice::from_ref(&fact))
        .await
        .unwrap();

    assert_eq!(report.promoted_facts, [fact.clone()]);
    let record = engine.record("u1").await.unwrap();
    assert!(record.personal_profile.contains("has dog named Rex"));
    assert!(!record.fact_frequency.contains_key(&fact));

    // Calls: (merge + significance) × 2, then merge + promotion + significance
    assert_eq!(stub.call_count(), 7);
}

#[tokio::test]
async fn multiple_due_facts_promote_in_one_combined_call() {
    let (engine, stub, _store) = setup();
    let facts = vec!["likes tea".to_string(), "plays chess".to_string()];

    for _ in 0..2 {
        engine.session_end("u1", "chatted", &facts).await.unwrap();
    }
    let calls_before = stub.call_count();

    stub.push_reply("recent context");
    stub.push_reply("Profile: [NEW] likes tea. [NEW] plays chess.");
    let report = engine.session_end("u1", "chatted", &facts).await.unwrap();

    assert_eq!(report.promoted_facts, facts);
    // merge + ONE promotion call + significance
    assert_eq!(stub.call_count() - calls_before, 3);

    let record = engine.record("u1").await.unwrap();
    assert!(record.fact_frequency.is_empty());
    assert!(record.personal_profile.contains("likes tea"));

    // The combined instruction listed both facts for the single call
    let promotion_call = &stub.calls()[calls_before + 1];
    assert!(promotion_call.user_message.contains("- likes tea"));
    assert!(promotion_call.user_message.contains("- plays chess"));
}

#[tokio::test]
async fn significant_summary_lands_in_milestones() {
    // Scenario: engagement announcement with a YES classifier
    let (engine, stub, _store) = setup();
    stub.push_reply("Recently got engaged.");
    stub.push_reply("YES");
    stub.push_reply("[NEW] Got engaged last weekend.");

    let report = engine
        .session_end("u1", "got engaged last weekend", &[])
        .await
        .unwrap();

    assert!(report.context_merged);
    assert!(report.milestone_recorded);

    let record = engine.record("u1").await.unwrap();
    assert_eq!(record.session_context, "Recently got engaged.");
    assert!(record.life_milestones.contains("Got engaged"));
}

#[tokio::test]
async fn put_layer_bypasses_the_summarizer() {
    let (engine, stub, _store) = setup();

    engine.put_layer("u1", 4, "custom text".into()).await.unwrap();

    let layers = engine.layers("u1").await.unwrap();
    let profile = layers.iter().find(|l| l.number == 4).unwrap();
    assert_eq!(profile.content, "custom text");
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn manual_promote_leaves_fact_counts_alone() {
    let (engine, stub, _store) = setup();

    // Seed a tracked fact
    stub.push_reply("context");
    engine
        .session_end("u1", "first session", &["collects vinyl".to_string()])
        .await
        .unwrap();

    stub.push_reply("Profile: [NEW] allergic to peanuts");
    engine.promote("u1", "allergic to peanuts", 4).await.unwrap();

    let record = engine.record("u1").await.unwrap();
    assert!(record.personal_profile.contains("allergic to peanuts"));
    assert_eq!(record.fact_frequency.get("collects vinyl"), Some(&1));
}

#[tokio::test]
async fn failed_promotion_keeps_counts_for_retry() {
    let (engine, stub, _store) = setup();
    let fact = "trains for a marathon".to_string();

    for _ in 0..2 {
        engine
            .session_end("u1", "running chat", std::slice::from_ref(&fact))
            .await
            .unwrap();
    }

    // Third mention: promotion merge fails
    stub.push_reply("recent context");
    stub.push_error(strata_core::SummarizerError::ApiError {
        status_code: 500,
        message: "overloaded".into(),
    });
    let report = engine
        .session_end("u1", "running chat", std::slice::from_ref(&fact))
        .await
        .unwrap();

    assert!(report.promoted_facts.is_empty());
    assert!(report.promotion_error.is_some());
    let record = engine.record("u1").await.unwrap();
    assert_eq!(record.fact_frequency.get(&fact), Some(&3));
    assert!(record.personal_profile.is_empty());

    // Next session end retries the scan even with no new mention
    stub.push_reply("recent context");
    stub.push_reply("Profile: [NEW] trains for a marathon");
    let report = engine.session_end("u1", "unrelated chat", &[]).await.unwrap();

    assert_eq!(report.promoted_facts, [fact.clone()]);
    let record = engine.record("u1").await.unwrap();
    assert!(!record.fact_frequency.contains_key(&fact));
    assert!(record.personal_profile.contains("marathon"));
}

#[tokio::test]
async fn context_merge_failure_still_records_facts() {
    let (engine, stub, _store) = setup();
    stub.push_error(strata_core::SummarizerError::ApiError {
        status_code: 400,
        message: "bad request".into(),
    });

    let report = engine
        .session_end("u1", "a summary", &["new fact".to_string()])
        .await
        .unwrap();

    assert!(!report.context_merged);
    assert!(report.context_error.is_some());
    assert_eq!(report.facts_recorded, 1);

    let record = engine.record("u1").await.unwrap();
    assert!(record.session_context.is_empty());
    assert_eq!(record.fact_frequency.get("new fact"), Some(&1));
}

#[tokio::test]
async fn significance_failure_does_not_undo_applied_steps() {
    let (engine, stub, _store) = setup();
    stub.push_reply("merged context");
    stub.push_error(strata_core::SummarizerError::Timeout("30s".into()));

    let report = engine
        .session_end("u1", "a summary", &["some fact".to_string()])
        .await
        .unwrap();

    assert!(report.context_merged);
    assert!(!report.milestone_recorded);
    assert!(report.significance_error.is_some());

    let record = engine.record("u1").await.unwrap();
    assert_eq!(record.session_context, "merged context");
    assert_eq!(record.fact_frequency.get("some fact"), Some(&1));
    assert!(record.life_milestones.is_empty());
}

#[tokio::test]
async fn concurrent_session_ends_lose_no_increment() {
    let (engine, _stub, _store) = setup();

    // Two devices finish sessions near-simultaneously with disjoint facts
    let a = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .session_end("u1", "session from the phone", &["fact a".to_string()])
                .await
        })
    };
    let b = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .session_end("u1", "session from the laptop", &["fact b".to_string()])
                .await
        })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let record = engine.record("u1").await.unwrap();
    assert_eq!(record.fact_frequency.get("fact a"), Some(&1));
    assert_eq!(record.fact_frequency.get("fact b"), Some(&1));
}

#[tokio::test]
async fn users_are_independent() {
    let (engine, _stub, _store) = setup();

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let user = format!("user-{i}");
            engine
                .session_end(&user, "their own session", &[format!("fact {i}")])
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for i in 0..8 {
        let record = engine.record(&format!("user-{i}")).await.unwrap();
        assert_eq!(record.fact_frequency.len(), 1);
        assert_eq!(record.fact_frequency.get(&format!("fact {i}")), Some(&1));
    }
}

#[tokio::test]
async fn style_analysis_writes_profile_field() {
    let (engine, stub, _store) = setup();
    stub.push_reply("Concise, dry humor, decides quickly.");

    let description = engine
        .analyze_style("u1", &["hey, short answers please".to_string()])
        .await
        .unwrap();
    assert_eq!(description, "Concise, dry humor, decides quickly.");

    let record = engine.record("u1").await.unwrap();
    assert!(
        record
            .personal_profile
            .contains("[communication_style] Concise, dry humor, decides quickly.")
    );

    // A second run replaces the field instead of appending another marker
    stub.push_reply("Now prefers detailed walkthroughs.");
    engine
        .analyze_style("u1", &["can you explain in depth?".to_string()])
        .await
        .unwrap();

    let record = engine.record("u1").await.unwrap();
    assert_eq!(
        record
            .personal_profile
            .matches("[communication_style]")
            .count(),
        1
    );
    assert!(record.personal_profile.contains("detailed walkthroughs"));
}

#[tokio::test]
async fn assembled_context_follows_priority_order() {
    let (engine, _stub, _store) = setup();

    engine.put_layer("u1", 2, "recent talk".into()).await.unwrap();
    engine.put_layer("u1", 4, "stable profile".into()).await.unwrap();
    engine.put_layer("u1", 5, "big milestone".into()).await.unwrap();

    let context = engine.build_context("u1").await.unwrap();
    assert_eq!(
        context,
        "[Profile]\nstable profile\n\n[Milestones]\nbig milestone\n\n[Recent]\nrecent talk"
    );

    // Unknown users assemble to an empty block
    assert!(engine.build_context("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn merge_respects_soft_budget_margin() {
    // A compliant stub reply within 1.3× of the 200-word milestone budget
    // passes through unclipped.
    let (engine, stub, _store) = setup();
    let reply = vec!["w"; 260].join(" ");
    stub.push_reply(reply.clone());
    stub.push_reply("YES");
    stub.push_reply(vec!["m"; 120].join(" "));

    engine
        .session_end("u1", "milestone-worthy summary", &[])
        .await
        .unwrap();

    let record = engine.record("u1").await.unwrap();
    assert_eq!(record.session_context.split_whitespace().count(), 260);
    assert!(record.session_context.split_whitespace().count() <= (500.0 * 1.3) as usize);
    assert_eq!(record.life_milestones.split_whitespace().count(), 120);
}
