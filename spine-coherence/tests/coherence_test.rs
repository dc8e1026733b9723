//! Coherence-engine integration tests against an in-memory store and
//! the scripted oracle.

use std::sync::Arc;

use async_trait::async_trait;
use spine_coherence::CoherenceEngine;
use spine_core::config::{CoherenceConfig, RevisionConfig};
use spine_core::errors::{SpineError, SpineResult};
use spine_core::event::{EventStatus, StoryEvent};
use spine_core::models::{ContradictionAxis, IngestionOutcome, OracleFinding};
use spine_core::traits::{IGraphStore, IScoringOracle};
use spine_graph::exclusivity::is_coherent;
use spine_graph::hydrate;
use spine_store::StoreEngine;
use test_fixtures::{story_event, ScriptedOracle};

fn engine_with(
    store: Arc<StoreEngine>,
    oracle: Arc<dyn IScoringOracle>,
    max_depth: usize,
) -> CoherenceEngine {
    CoherenceEngine::new(
        store,
        oracle,
        CoherenceConfig::default(),
        RevisionConfig {
            max_cascade_depth: max_depth,
        },
    )
}

/// Append an already-sequenced event through the engine.
async fn commit(
    engine: &CoherenceEngine,
    event: &StoryEvent,
) -> spine_core::models::CommitOutcome {
    engine.evaluate_and_commit(event).await.unwrap()
}

#[tokio::test]
async fn clean_event_commits_active() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let oracle = Arc::new(ScriptedOracle::new());
    let engine = engine_with(store.clone(), oracle.clone(), 5);

    let event = story_event("a1", "joined the support rotation", 1);
    let outcome = commit(&engine, &event).await;

    assert_eq!(outcome.outcome, IngestionOutcome::Clean);
    assert!(outcome.contradictions.is_empty());
    assert_eq!(outcome.graph_version, 1);
    let stored = store.get_event(&event.event_id).unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Active);
    // Empty window: the oracle is never consulted for the first event.
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn commit_is_idempotent_for_replays() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let oracle = Arc::new(ScriptedOracle::new());
    let engine = engine_with(store.clone(), oracle, 5);

    let event = story_event("a1", "fact", 1);
    commit(&engine, &event).await;
    // Crash-replay: same event again. No duplicate node, no error.
    commit(&engine, &event).await;

    assert_eq!(store.full_history("a1").unwrap().len(), 1);
}

#[tokio::test]
async fn budget_contradiction_supersedes_and_stays_coherent() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let oracle = Arc::new(ScriptedOracle::new());
    oracle.flag("budget is $1000", "budget is $500", ContradictionAxis::Fact, 0.85);
    let engine = engine_with(store.clone(), oracle, 5);

    let mut old = story_event("a1", "budget is $500", 1);
    old.confidence = 0.7.into();
    commit(&engine, &old).await;

    let mut new = story_event("a1", "budget is $1000", 2);
    new.confidence = 0.9.into();
    new.timestamp = old.timestamp + chrono::Duration::seconds(60);
    let outcome = commit(&engine, &new).await;

    assert_eq!(outcome.outcome, IngestionOutcome::Resolved);
    assert_eq!(outcome.contradictions.len(), 1);
    assert_eq!(outcome.contradictions[0].event_id, old.event_id);
    let resolution = outcome.resolution.unwrap();
    assert_eq!(resolution.winner_id, new.event_id);

    let stored_old = store.get_event(&old.event_id).unwrap().unwrap();
    assert_eq!(stored_old.status, EventStatus::Superseded);
    assert_eq!(stored_old.superseded_by, Some(new.event_id.clone()));

    // Only the winner remains in the Active window.
    let window = store.recent_window("a1", 10, false).unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].content, "budget is $1000");

    let graph = hydrate(store.as_ref(), "a1").unwrap();
    assert!(is_coherent(&graph));
}

#[tokio::test]
async fn sub_threshold_findings_are_ignored() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let oracle = Arc::new(ScriptedOracle::new());
    oracle.flag("the sky is green", "the sky is blue", ContradictionAxis::Fact, 0.4);
    let engine = engine_with(store.clone(), oracle, 5);

    commit(&engine, &story_event("a1", "the sky is blue", 1)).await;
    let outcome = commit(&engine, &story_event("a1", "the sky is green", 2)).await;

    // 0.4 < 0.6 actionability threshold: logged, not acted on.
    assert_eq!(outcome.outcome, IngestionOutcome::Clean);
    assert_eq!(store.recent_window("a1", 10, false).unwrap().len(), 2);
}

#[tokio::test]
async fn causal_parents_link_with_weakened_flag() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let oracle = Arc::new(ScriptedOracle::new());
    let engine = engine_with(store.clone(), oracle, 5);

    let parent = story_event("a1", "the parent claim", 1);
    commit(&engine, &parent).await;
    store
        .mark_status(&parent.event_id, EventStatus::Superseded, None, "test")
        .unwrap();

    let mut child = story_event("a1", "depends on the parent", 2);
    child.causal_parents = vec![parent.event_id.clone()];
    commit(&engine, &child).await;

    let edges = store.edges_for_agent("a1").unwrap();
    assert_eq!(edges.len(), 1);
    assert!(edges[0].weakened, "superseded parent links weakened");
}

#[tokio::test]
async fn unknown_causal_parent_is_terminal() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let oracle = Arc::new(ScriptedOracle::new());
    let engine = engine_with(store.clone(), oracle, 5);

    let mut event = story_event("a1", "depends on nothing real", 1);
    event.causal_parents = vec!["no-such-event".to_string()];
    let err = engine.evaluate_and_commit(&event).await.unwrap_err();

    assert!(matches!(err, SpineError::Graph(_)), "got {err}");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn cascade_reevaluates_sole_support_dependents() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let oracle = Arc::new(ScriptedOracle::new());
    // The dependent only conflicts with a statement that enters the
    // story later, so its own ingestion is clean.
    oracle.flag("budget is $1000", "budget is $500", ContradictionAxis::Fact, 0.85);
    oracle.flag("hire a junior dev", "hiring is frozen", ContradictionAxis::Goal, 0.9);
    let engine = engine_with(store.clone(), oracle, 5);

    let mut budget = story_event("a1", "budget is $500", 1);
    budget.confidence = 0.7.into();
    commit(&engine, &budget).await;

    let mut hire = story_event("a1", "hire a junior dev", 2);
    hire.confidence = 0.6.into();
    hire.causal_parents = vec![budget.event_id.clone()];
    let outcome = commit(&engine, &hire).await;
    assert_eq!(outcome.outcome, IngestionOutcome::Clean);

    let mut freeze = story_event("a1", "hiring is frozen", 3);
    freeze.confidence = 0.95.into();
    commit(&engine, &freeze).await;

    let mut revised = story_event("a1", "budget is $1000", 4);
    revised.confidence = 0.9.into();
    revised.timestamp = budget.timestamp + chrono::Duration::seconds(120);
    let outcome = commit(&engine, &revised).await;

    // Round 0: revised beats budget. Cascade: hire lost its sole
    // support, re-evaluated, found contradicting the freeze, and lost
    // that round too.
    assert_eq!(outcome.outcome, IngestionOutcome::Resolved);
    let resolution = outcome.resolution.unwrap();
    assert_eq!(resolution.depth_reached, 1);
    assert!(resolution.superseded.contains(&budget.event_id));
    assert!(resolution.superseded.contains(&hire.event_id));

    let stored_hire = store.get_event(&hire.event_id).unwrap().unwrap();
    assert_eq!(stored_hire.status, EventStatus::Superseded);
    assert_eq!(stored_hire.superseded_by, Some(freeze.event_id.clone()));

    let graph = hydrate(store.as_ref(), "a1").unwrap();
    assert!(is_coherent(&graph));
}

#[tokio::test]
async fn cascade_depth_bound_parks_chain_for_review() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let oracle = Arc::new(ScriptedOracle::new());
    oracle.flag("budget is $1000", "budget is $500", ContradictionAxis::Fact, 0.85);
    oracle.flag("hire a junior dev", "hiring is frozen", ContradictionAxis::Goal, 0.9);
    // Depth bound 1: the re-evaluated dependent may not auto-resolve.
    let engine = engine_with(store.clone(), oracle, 1);

    let mut budget = story_event("a1", "budget is $500", 1);
    budget.confidence = 0.7.into();
    commit(&engine, &budget).await;
    let mut hire = story_event("a1", "hire a junior dev", 2);
    hire.confidence = 0.6.into();
    hire.causal_parents = vec![budget.event_id.clone()];
    commit(&engine, &hire).await;
    let mut freeze = story_event("a1", "hiring is frozen", 3);
    freeze.confidence = 0.95.into();
    commit(&engine, &freeze).await;

    let mut revised = story_event("a1", "budget is $1000", 4);
    revised.confidence = 0.9.into();
    revised.timestamp = budget.timestamp + chrono::Duration::seconds(120);
    let outcome = commit(&engine, &revised).await;

    assert_eq!(outcome.outcome, IngestionOutcome::NeedsReview);
    let resolution = outcome.resolution.unwrap();
    assert_eq!(resolution.needs_review, vec![hire.event_id.clone()]);
    assert!(!resolution.fully_resolved());

    let stored_hire = store.get_event(&hire.event_id).unwrap().unwrap();
    assert_eq!(stored_hire.status, EventStatus::NeedsReview);
    // NeedsReview is out of the Active story, so exclusivity holds.
    let graph = hydrate(store.as_ref(), "a1").unwrap();
    assert!(is_coherent(&graph));
}

struct SlowOracle;

#[async_trait]
impl IScoringOracle for SlowOracle {
    async fn score(&self, _: &str, _: &[String]) -> SpineResult<Vec<OracleFinding>> {
        tokio::time::sleep(std::time::Duration::from_secs(120)).await;
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

#[tokio::test(start_paused = true)]
async fn oracle_timeout_is_transient_not_clean() {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let engine = engine_with(store.clone(), Arc::new(SlowOracle), 5);

    // Seed one event so the window is non-empty and the oracle runs.
    commit(&engine, &story_event("a1", "seed fact", 1)).await;

    let err = engine
        .evaluate_and_commit(&story_event("a1", "late fact", 2))
        .await
        .unwrap_err();

    assert!(err.is_transient(), "timeout must be retryable: {err}");
    // The event was NOT committed as a clean node.
    assert_eq!(store.full_history("a1").unwrap().len(), 1);
}
