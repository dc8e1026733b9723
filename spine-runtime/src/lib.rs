//! # spine-runtime
//!
//! The service layer of the Narrative Spine: the ingestion gateway
//! (validate, deduplicate, durably log, ack), the per-agent sequencer
//! lanes (strict order within an agent, full parallelism across
//! agents, retry/backoff/dead-letter), the coherence alert channel,
//! and the `NarrativeSpine` facade that wires everything together.

pub mod alerts;
pub mod gateway;
pub mod sequencer;
pub mod service;
pub mod telemetry;

pub use alerts::AlertBus;
pub use gateway::IngestGateway;
pub use sequencer::Sequencer;
pub use service::NarrativeSpine;
