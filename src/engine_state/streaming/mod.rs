//! # Chunk Streaming
//!
//! Deciding which chunks should exist and making it so.
//!
//! * `planner` - Flood-fills the wanted chunk set around a focus chunk
//! * `lifecycle` - Diffs the wanted set against the registry, generates and
//!   evicts chunks, and recycles renderers
//!
//! The streaming driver in the parent module sequences these with mesh
//! builds; neither touches the task system itself.

pub mod lifecycle;
pub mod planner;

pub use lifecycle::{ChunkLifecycleManager, ReconcileReport};
pub use planner::{expected_count, ChunkSetPlanner, VerticalPolicy};
