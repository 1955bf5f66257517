//! Background tasks for the rendering system.
//!
//! Mesh builds are the expensive part of streaming, so they run on the
//! task manager's workers while the driver keeps ticking.
//!
//! # Available Tasks
//! - `ChunkMeshTask`: Builds the mesh of one chunk for one renderer

pub mod chunk_mesh_task;

pub use chunk_mesh_task::{ChunkMeshResult, ChunkMeshTask};
