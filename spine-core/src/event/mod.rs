//! The story-event data contract: inbound envelope, committed record,
//! and the confidence newtype shared by both.

pub mod confidence;
pub mod envelope;
pub mod story_event;

pub use confidence::Confidence;
pub use envelope::{EventEnvelope, IngestAck};
pub use story_event::{EventStatus, EventType, StoryEvent};
