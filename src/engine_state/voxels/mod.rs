//! # Voxel Data
//!
//! Representation of the voxel world, chunk by chunk.
//!
//! ## Architecture
//!
//! * **Coordinates**: chunk-space and chunk-local integer positions
//! * **Face Direction**: the six axis-aligned voxel faces
//! * **Height Field**: the pluggable terrain function chunks are filled from
//! * **Chunk**: a chunk's solidity bits and lifecycle state
//! * **Registry**: the resident chunks, and solidity queries across chunk boundaries
//!
//! ## Data Flow
//!
//! 1. Reconciliation asks for a chunk at a coordinate
//! 2. The chunk samples the height field once per column and fills its grid
//! 3. The chunk is inserted into the registry
//! 4. Mesh builds read it, and its neighbours, through the registry
//!
//! ## Thread Safety
//!
//! * Voxel grids are immutable once filled and shared behind `Arc`
//! * The registry is only mutated while no mesh build is running
//! * Height fields are `Send + Sync` and stateless (or internally locked)

pub mod chunk;
pub mod coordinates;
pub mod face_direction;
pub mod height_field;
pub mod registry;
