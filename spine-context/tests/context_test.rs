//! Cache behavior: versioned entries, staleness on invalidation,
//! read-your-writes waits, and summary contents.

use std::sync::Arc;

use spine_coherence::CoherenceScorer;
use spine_context::{build_summary, StoryContextCache};
use spine_core::config::{CacheConfig, ScorerConfig};
use spine_core::event::EventStatus;
use spine_core::traits::IGraphStore;
use spine_store::StoreEngine;
use test_fixtures::story_event;

fn setup(config: CacheConfig) -> (Arc<StoreEngine>, Arc<StoryContextCache>) {
    let store = Arc::new(StoreEngine::open_in_memory().unwrap());
    let scorer = Arc::new(CoherenceScorer::new(ScorerConfig::default()));
    let graph_store: Arc<dyn IGraphStore> = store.clone();
    let cache = Arc::new(StoryContextCache::new(config, graph_store, scorer));
    (store, cache)
}

#[tokio::test]
async fn summary_reflects_active_story_only() {
    let (store, _) = setup(CacheConfig::default());
    let keep = story_event("a1", "budget is $1000", 2);
    let gone = story_event("a1", "budget is $500", 1);
    store.append_node(&gone).unwrap();
    store.append_node(&keep).unwrap();
    store
        .mark_status(&gone.event_id, EventStatus::Superseded, Some(&keep.event_id), "test")
        .unwrap();

    let summary = build_summary(store.as_ref(), "a1", 10).unwrap();
    assert_eq!(summary.statements.len(), 1);
    assert_eq!(summary.statements[0].content, "budget is $1000");
    assert_eq!(summary.active_count, 1);
    assert_eq!(summary.open_reviews, 0);
}

#[tokio::test]
async fn get_serves_cached_entry_until_invalidated() {
    let (store, cache) = setup(CacheConfig::default());
    store.append_node(&story_event("a1", "one", 1)).unwrap();

    let first = cache.get("a1").unwrap();
    assert_eq!(first.graph_version, 1);
    assert_eq!(first.summary.statements.len(), 1);

    // A mutation without an invalidation signal: the cached entry is
    // still served (watermark unchanged).
    store.append_node(&story_event("a1", "two", 2)).unwrap();
    let stale = cache.get("a1").unwrap();
    assert_eq!(stale.graph_version, 1);

    // Marking stale forces a lazy recompute on the next read.
    cache.note_version("a1", 2);
    let fresh = cache.get("a1").unwrap();
    assert_eq!(fresh.graph_version, 2);
    assert_eq!(fresh.summary.statements.len(), 2);
}

#[tokio::test]
async fn invalidation_listener_marks_entries_stale() {
    let (store, cache) = setup(CacheConfig::default());
    cache.spawn_invalidation_listener(store.subscribe_invalidations());

    store.append_node(&story_event("a1", "one", 1)).unwrap();
    // Let the listener drain the signal.
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let context = cache.get("a1").unwrap();
    assert_eq!(context.graph_version, 1);

    store.append_node(&story_event("a1", "two", 2)).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let fresh = cache.get("a1").unwrap();
    assert_eq!(fresh.graph_version, 2);
}

#[tokio::test]
async fn get_at_least_waits_for_the_version() {
    let (store, cache) = setup(CacheConfig {
        read_your_writes_wait_ms: 2_000,
        ..CacheConfig::default()
    });
    store.append_node(&story_event("a1", "one", 1)).unwrap();
    cache.note_version("a1", 1);

    // Writer lands version 2 shortly after the read starts.
    let writer_store = store.clone();
    let writer_cache = cache.clone();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        writer_store.append_node(&story_event("a1", "two", 2)).unwrap();
        writer_cache.note_version("a1", 2);
    });

    let context = cache.get_at_least("a1", 2).await.unwrap();
    assert!(context.graph_version >= 2);
    assert_eq!(context.summary.statements.len(), 2);
    writer.await.unwrap();
}

#[tokio::test]
async fn get_at_least_falls_back_to_store_after_bounded_wait() {
    let (store, cache) = setup(CacheConfig {
        read_your_writes_wait_ms: 100,
        ..CacheConfig::default()
    });
    store.append_node(&story_event("a1", "one", 1)).unwrap();

    // min_version 5 will never arrive; after the bounded wait the
    // cache serves the store's actual state instead of hanging.
    let context = cache.get_at_least("a1", 5).await.unwrap();
    assert_eq!(context.graph_version, 1);
}

#[tokio::test]
async fn unknown_agent_yields_empty_context() {
    let (_store, cache) = setup(CacheConfig::default());
    let context = cache.get("ghost").unwrap();
    assert_eq!(context.graph_version, 0);
    assert!(context.summary.statements.is_empty());
    assert_eq!(context.coherence_score, 1.0);
}
