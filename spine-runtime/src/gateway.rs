//! The event ingestion gateway. Validation and backpressure are
//! synchronous; everything after the durable intake append is not.
//! Once the publisher has its ack the event cannot be lost.

use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use spine_core::config::IntakeConfig;
use spine_core::errors::{IntakeError, SpineResult};
use spine_core::event::{EventEnvelope, IngestAck, StoryEvent};
use spine_core::traits::IGraphStore;
use spine_store::StoreEngine;

use crate::sequencer::Sequencer;

/// The gateway. One per spine; publishers reach it via the bus adapter.
pub struct IngestGateway {
    config: IntakeConfig,
    store: Arc<StoreEngine>,
    sequencer: Sequencer,
}

impl IngestGateway {
    pub fn new(config: IntakeConfig, store: Arc<StoreEngine>, sequencer: Sequencer) -> Self {
        Self {
            config,
            store,
            sequencer,
        }
    }

    /// Accept one envelope: validate, dedupe, durably log, ack, and
    /// hand off asynchronously.
    #[instrument(skip(self, envelope), fields(agent_id = %envelope.agent_id))]
    pub async fn ingest(&self, envelope: EventEnvelope) -> SpineResult<IngestAck> {
        envelope.validate(self.config.max_content_len)?;

        // Reject before writing anything so a backpressured envelope
        // leaves no intake entry to replay later.
        if self.sequencer.is_backpressured(&envelope.agent_id) {
            return Err(IntakeError::AgentBackpressure {
                agent_id: envelope.agent_id.clone(),
                depth: self.sequencer.lane_capacity(),
            }
            .into());
        }

        let idempotency_key = envelope.idempotency_key();
        let event_id = Uuid::new_v4().to_string();
        let appended = self
            .store
            .intake_append(&envelope, &event_id, idempotency_key.as_deref())?;

        // Freshness floor: the first mutation this event causes will
        // be at least this version. Readers needing read-your-writes
        // pass it to the cache's bounded-wait read.
        let graph_version_floor = self.store.graph_version(&envelope.agent_id)? + 1;

        if appended.deduplicated {
            debug!(event_id = %appended.event_id, "duplicate delivery, returning original ack");
            return Ok(IngestAck {
                event_id: appended.event_id,
                agent_id: envelope.agent_id,
                intake_seq: appended.intake_seq,
                graph_version_floor,
                deduplicated: true,
            });
        }

        let event =
            StoryEvent::from_envelope(&envelope, appended.event_id.clone(), appended.intake_seq);
        // Deferred (halted lane) is still an accepted ingestion; the
        // entry waits in the intake log.
        self.sequencer.enqueue(event).await?;

        Ok(IngestAck {
            event_id: appended.event_id,
            agent_id: envelope.agent_id,
            intake_seq: appended.intake_seq,
            graph_version_floor,
            deduplicated: false,
        })
    }
}
