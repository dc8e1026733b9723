//! One lane: the single consumer task for one agent's events.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, warn};

use spine_core::event::StoryEvent;
use spine_core::traits::IGraphStore;

use super::backoff::retry_delay;
use super::SequencerInner;

/// Consume the lane until the channel closes or a dead letter halts it.
pub(crate) async fn run(
    inner: Arc<SequencerInner>,
    agent_id: String,
    mut receiver: mpsc::Receiver<StoryEvent>,
) {
    while let Some(event) = receiver.recv().await {
        if !process_one(&inner, &event).await {
            // Dead-lettered: halt without draining. Later events stay
            // durable in the intake log and re-enter on replay.
            inner.lanes.remove(&agent_id);
            return;
        }
    }
    inner.lanes.remove(&agent_id);
}

/// Retry-until-commit for one event. Returns false when the event was
/// parked and the lane must halt.
async fn process_one(inner: &Arc<SequencerInner>, event: &StoryEvent) -> bool {
    let mut attempt: u32 = 0;
    loop {
        match inner.engine.evaluate_and_commit(event).await {
            Ok(outcome) => {
                if let Err(e) = inner.store.intake_mark_processed(&event.event_id) {
                    // The commit is idempotent, so a replay after this
                    // failure converges; losing the mark costs one
                    // redundant evaluation at next startup.
                    warn!(event_id = %event.event_id, error = %e, "failed to mark intake processed");
                }

                let store: &dyn IGraphStore = inner.store.as_ref();
                match inner.scorer.record(store, &event.agent_id, outcome.outcome) {
                    Ok(update) => {
                        let threshold = inner.scorer.alert_threshold();
                        if update.crossed_below {
                            inner.alerts.emit_low_coherence(
                                &event.agent_id,
                                update.score.value,
                                threshold,
                            );
                        }
                        let unresolved = outcome
                            .resolution
                            .as_ref()
                            .is_some_and(|r| !r.fully_resolved());
                        if unresolved {
                            inner.alerts.emit_review_required(
                                &event.agent_id,
                                update.score.value,
                                threshold,
                            );
                        }
                    }
                    Err(e) => {
                        warn!(agent_id = %event.agent_id, error = %e, "coherence score update failed");
                    }
                }
                return true;
            }
            Err(e) if e.is_transient() && attempt < inner.config.max_retries => {
                attempt += 1;
                let delay = retry_delay(&inner.config, attempt);
                warn!(
                    agent_id = %event.agent_id,
                    event_id = %event.event_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                error!(
                    agent_id = %event.agent_id,
                    event_id = %event.event_id,
                    retries = attempt,
                    error = %e,
                    "event dead-lettered, halting lane"
                );
                if let Err(park_err) = inner.store.park_dead_letter(
                    &event.agent_id,
                    &event.event_id,
                    &e.to_string(),
                    attempt,
                ) {
                    error!(
                        event_id = %event.event_id,
                        error = %park_err,
                        "failed to park dead letter"
                    );
                }
                return false;
            }
        }
    }
}
