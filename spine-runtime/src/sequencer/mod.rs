//! The per-agent sequencer: one bounded lane per agent_id, strict
//! intake order within a lane, unbounded concurrency across lanes.
//!
//! A lane that exhausts retries parks its event as a dead letter and
//! halts — it never advances past a failed event, trading availability
//! for that one agent against ordering correctness. Replay resumes it.

pub mod backoff;
mod lane;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

use spine_coherence::{CoherenceEngine, CoherenceScorer};
use spine_core::config::SequencerConfig;
use spine_core::errors::SpineResult;
use spine_core::event::StoryEvent;
use spine_store::StoreEngine;

use crate::alerts::AlertBus;

/// Where an accepted event went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Handed to the agent's lane.
    Queued,
    /// The agent's lane is halted on a dead letter; the event stays
    /// pending in the intake log until the lane is resumed.
    Deferred,
}

pub(crate) struct SequencerInner {
    pub(crate) config: SequencerConfig,
    pub(crate) store: Arc<StoreEngine>,
    pub(crate) engine: Arc<CoherenceEngine>,
    pub(crate) scorer: Arc<CoherenceScorer>,
    pub(crate) alerts: AlertBus,
    pub(crate) lanes: DashMap<String, LaneHandle>,
}

pub(crate) struct LaneHandle {
    pub(crate) sender: mpsc::Sender<StoryEvent>,
}

/// Cloneable sequencer handle.
#[derive(Clone)]
pub struct Sequencer {
    inner: Arc<SequencerInner>,
}

impl Sequencer {
    pub fn new(
        config: SequencerConfig,
        store: Arc<StoreEngine>,
        engine: Arc<CoherenceEngine>,
        scorer: Arc<CoherenceScorer>,
        alerts: AlertBus,
    ) -> Self {
        Self {
            inner: Arc::new(SequencerInner {
                config,
                store,
                engine,
                scorer,
                alerts,
                lanes: DashMap::new(),
            }),
        }
    }

    /// Whether the agent's lane queue is at capacity. Checked by the
    /// gateway before the intake write so a rejected envelope leaves
    /// no trace.
    pub fn is_backpressured(&self, agent_id: &str) -> bool {
        self.inner
            .lanes
            .get(agent_id)
            .map(|lane| lane.sender.capacity() == 0)
            .unwrap_or(false)
    }

    pub fn lane_capacity(&self) -> usize {
        self.inner.config.lane_capacity
    }

    /// Hand an intake-logged event to its agent's lane.
    pub async fn enqueue(&self, event: StoryEvent) -> SpineResult<EnqueueOutcome> {
        // A halted lane is only resumed via dead-letter replay; new
        // events wait in the intake log behind the parked one.
        if self.inner.store.has_parked_dead_letter(&event.agent_id)? {
            debug!(agent_id = %event.agent_id, event_id = %event.event_id, "lane halted, deferring");
            return Ok(EnqueueOutcome::Deferred);
        }

        let sender = self.lane_sender(&event.agent_id);
        let agent_id = event.agent_id.clone();
        match sender.send(event).await {
            Ok(()) => Ok(EnqueueOutcome::Queued),
            Err(_) => {
                // Lane halted between lookup and send. The event is
                // durable in the intake log; replay picks it up.
                self.inner.lanes.remove(&agent_id);
                Ok(EnqueueOutcome::Deferred)
            }
        }
    }

    /// Replay all pending intake entries (startup recovery). Agents
    /// with a parked dead letter stay halted.
    pub async fn replay_pending(&self) -> SpineResult<usize> {
        let mut replayed = 0;
        for row in self.inner.store.intake_pending()? {
            if self.inner.store.has_parked_dead_letter(&row.agent_id)? {
                continue;
            }
            let event = StoryEvent::from_envelope(&row.envelope, row.event_id, row.intake_seq);
            if self.enqueue(event).await? == EnqueueOutcome::Queued {
                replayed += 1;
            }
        }
        if replayed > 0 {
            info!(replayed, "replayed pending intake entries");
        }
        Ok(replayed)
    }

    /// Replay one dead letter and resume the agent's lane: the parked
    /// event and everything queued behind it re-enter in intake order.
    pub async fn replay_dead_letter(&self, id: i64) -> SpineResult<String> {
        let (agent_id, event_id) = self.inner.store.mark_dead_letter_replayed(id)?;
        info!(%agent_id, %event_id, "dead letter replayed, resuming lane");

        for row in self.inner.store.intake_pending()? {
            if row.agent_id != agent_id {
                continue;
            }
            let event = StoryEvent::from_envelope(&row.envelope, row.event_id, row.intake_seq);
            self.enqueue(event).await?;
        }
        Ok(event_id)
    }

    /// Lane depth for one agent (queued, not yet processed).
    pub fn lane_depth(&self, agent_id: &str) -> usize {
        self.inner
            .lanes
            .get(agent_id)
            .map(|lane| self.inner.config.lane_capacity - lane.sender.capacity())
            .unwrap_or(0)
    }

    fn lane_sender(&self, agent_id: &str) -> mpsc::Sender<StoryEvent> {
        let handle = self
            .inner
            .lanes
            .entry(agent_id.to_string())
            .or_insert_with(|| {
                let (sender, receiver) = mpsc::channel(self.inner.config.lane_capacity);
                let inner = Arc::clone(&self.inner);
                let agent = agent_id.to_string();
                tokio::spawn(lane::run(inner, agent, receiver));
                LaneHandle { sender }
            });
        handle.sender.clone()
    }
}
