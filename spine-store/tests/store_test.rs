//! Integration tests for the storage engine.

use spine_core::event::EventStatus;
use spine_core::models::EdgeKind;
use spine_core::traits::IGraphStore;
use spine_store::StoreEngine;
use test_fixtures::{story_event, EnvelopeBuilder};

#[test]
fn migrations_apply_idempotently_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spine.db");
    {
        let engine = StoreEngine::open(&path, 2).unwrap();
        engine.append_node(&story_event("a1", "first fact", 1)).unwrap();
    }
    // Reopen: migrations rerun against the existing schema.
    let engine = StoreEngine::open(&path, 2).unwrap();
    assert_eq!(engine.full_history("a1").unwrap().len(), 1);
}

#[test]
fn append_bumps_graph_version() {
    let engine = StoreEngine::open_in_memory().unwrap();
    assert_eq!(engine.graph_version("a1").unwrap(), 0);
    engine.append_node(&story_event("a1", "one", 1)).unwrap();
    engine.append_node(&story_event("a1", "two", 2)).unwrap();
    assert_eq!(engine.graph_version("a1").unwrap(), 2);
    // Other agents are independent.
    assert_eq!(engine.graph_version("a2").unwrap(), 0);
}

#[test]
fn mark_status_records_audit_and_supersession() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let old = story_event("a1", "budget is $500", 1);
    let new = story_event("a1", "budget is $1000", 2);
    engine.append_node(&old).unwrap();
    engine.append_node(&new).unwrap();

    engine
        .mark_status(
            &old.event_id,
            EventStatus::Superseded,
            Some(&new.event_id),
            "lost tie-break",
        )
        .unwrap();

    let reread = engine.get_event(&old.event_id).unwrap().unwrap();
    assert_eq!(reread.status, EventStatus::Superseded);
    assert_eq!(reread.superseded_by, Some(new.event_id.clone()));
    assert_eq!(engine.audit_count(&old.event_id).unwrap(), 1);
}

#[test]
fn mark_status_on_unknown_event_is_not_found() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let err = engine
        .mark_status("missing", EventStatus::Retracted, None, "x")
        .unwrap_err();
    assert!(err.to_string().contains("not found"), "got {err}");
}

#[test]
fn recent_window_filters_inactive_and_orders_newest_first() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let e1 = story_event("a1", "one", 1);
    let e2 = story_event("a1", "two", 2);
    let e3 = story_event("a1", "three", 3);
    for e in [&e1, &e2, &e3] {
        engine.append_node(e).unwrap();
    }
    engine
        .mark_status(&e2.event_id, EventStatus::Superseded, Some(&e3.event_id), "test")
        .unwrap();

    let window = engine.recent_window("a1", 10, false).unwrap();
    let contents: Vec<_> = window.iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["three", "one"]);

    let audit_window = engine.recent_window("a1", 10, true).unwrap();
    assert_eq!(audit_window.len(), 3);
}

#[test]
fn edges_round_trip_and_ignore_duplicates() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let parent = story_event("a1", "parent", 1);
    let child = story_event("a1", "child", 2);
    engine.append_node(&parent).unwrap();
    engine.append_node(&child).unwrap();

    engine
        .add_edge(&parent.event_id, &child.event_id, EdgeKind::Causal, false)
        .unwrap();
    // Replays re-insert the same edge; it must not duplicate.
    engine
        .add_edge(&parent.event_id, &child.event_id, EdgeKind::Causal, false)
        .unwrap();
    engine
        .add_edge(&child.event_id, &parent.event_id, EdgeKind::Contradicts, false)
        .unwrap();

    let edges = engine.edges_for_agent("a1").unwrap();
    assert_eq!(edges.len(), 2);
    assert!(edges
        .iter()
        .any(|e| e.kind == EdgeKind::Causal && e.from_id == parent.event_id));
    assert!(edges.iter().any(|e| e.kind == EdgeKind::Contradicts));
}

#[test]
fn intake_append_assigns_per_agent_sequences() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let env_a1 = EnvelopeBuilder::new("a1", "one").build();
    let env_a2 = EnvelopeBuilder::new("a2", "other agent").build();
    let env_a1_second = EnvelopeBuilder::new("a1", "two").build();

    let first = engine.intake_append(&env_a1, "e1", None).unwrap();
    let other = engine.intake_append(&env_a2, "e2", None).unwrap();
    let second = engine.intake_append(&env_a1_second, "e3", None).unwrap();

    assert_eq!(first.intake_seq, 1);
    assert_eq!(other.intake_seq, 1);
    assert_eq!(second.intake_seq, 2);
}

#[test]
fn intake_dedupes_on_idempotency_key() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let envelope = EnvelopeBuilder::new("a1", "claim")
        .local_reference("turn-7")
        .build();
    let key = envelope.idempotency_key().unwrap();

    let first = engine.intake_append(&envelope, "e1", Some(&key)).unwrap();
    let second = engine.intake_append(&envelope, "e2", Some(&key)).unwrap();

    assert!(!first.deduplicated);
    assert!(second.deduplicated);
    assert_eq!(second.event_id, "e1");
    assert_eq!(second.intake_seq, first.intake_seq);
    assert_eq!(engine.intake_pending_count("a1").unwrap(), 1);
}

#[test]
fn pending_excludes_processed_and_dead_lettered() {
    let engine = StoreEngine::open_in_memory().unwrap();
    for (id, content) in [("e1", "one"), ("e2", "two"), ("e3", "three")] {
        let envelope = EnvelopeBuilder::new("a1", content).build();
        engine.intake_append(&envelope, id, None).unwrap();
    }
    engine.intake_mark_processed("e1").unwrap();
    engine.park_dead_letter("a1", "e2", "oracle unavailable", 5).unwrap();

    let pending = engine.intake_pending().unwrap();
    let ids: Vec<_> = pending.iter().map(|r| r.event_id.as_str()).collect();
    assert_eq!(ids, vec!["e3"]);
    assert!(engine.has_parked_dead_letter("a1").unwrap());

    // Replaying the dead letter puts e2 back into the pending set.
    let letters = engine.dead_letters("a1").unwrap();
    assert_eq!(letters.len(), 1);
    let (agent_id, event_id) = engine.mark_dead_letter_replayed(letters[0].id).unwrap();
    assert_eq!(agent_id, "a1");
    assert_eq!(event_id, "e2");
    assert!(!engine.has_parked_dead_letter("a1").unwrap());

    let pending = engine.intake_pending().unwrap();
    let ids: Vec<_> = pending.iter().map(|r| r.event_id.as_str()).collect();
    assert_eq!(ids, vec!["e2", "e3"]);
}

#[test]
fn scores_persist_per_agent() {
    let engine = StoreEngine::open_in_memory().unwrap();
    assert!(engine.load_score("a1").unwrap().is_none());

    let mut score = spine_core::models::CoherenceScore::baseline("a1");
    score.value = 0.55;
    engine.save_score(&score).unwrap();
    let loaded = engine.load_score("a1").unwrap().unwrap();
    assert!((loaded.value - 0.55).abs() < 1e-9);
}

#[tokio::test]
async fn mutations_emit_invalidation_signals() {
    let engine = StoreEngine::open_in_memory().unwrap();
    let mut rx = engine.subscribe_invalidations();
    engine.append_node(&story_event("a1", "one", 1)).unwrap();

    let signal = rx.recv().await.unwrap();
    assert_eq!(signal.agent_id, "a1");
    assert_eq!(signal.graph_version, 1);
}

#[test]
fn concurrent_writes_across_agents() {
    use std::sync::Arc;

    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(StoreEngine::open(&dir.path().join("spine.db"), 4).unwrap());

    let mut handles = Vec::new();
    for agent in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            let agent_id = format!("agent-{agent}");
            for seq in 1..=25 {
                let event = story_event(&agent_id, &format!("fact {seq}"), seq);
                engine.append_node(&event).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    for agent in 0..4 {
        let agent_id = format!("agent-{agent}");
        assert_eq!(engine.full_history(&agent_id).unwrap().len(), 25);
        assert_eq!(engine.graph_version(&agent_id).unwrap(), 25);
    }
}
