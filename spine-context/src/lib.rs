//! # spine-context
//!
//! The story-context cache. Serves compact, version-stamped narrative
//! summaries to collaborating services. Invalidation marks entries
//! stale; recompute is lazy on the next read so graph writes never
//! block on summarization. A TTL bounds staleness even if an
//! invalidation signal is lost.

pub mod cache;
pub mod summary;

pub use cache::StoryContextCache;
pub use summary::build_summary;
