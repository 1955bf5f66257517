//! # Error Types
//!
//! Error taxonomy for the streaming engine.
//!
//! * [`ConfigError`] - invalid settings; fatal at construction
//! * [`RegistryError`] - registry invariant violations; fatal for the cycle
//! * [`MeshError`] - mesh build failures; some are retried on the next tick
//! * [`StreamingError`] - what the driver's `tick` reports upward
//!
//! Missing neighbour chunks are not errors at all: the cross-chunk solidity
//! query resolves them to "not solid" and never surfaces them.

use thiserror::Error;

use crate::core::LockPoisoned;
use crate::engine_state::voxels::coordinates::ChunkCoordinate;

/// Settings that cannot produce a valid world.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A dimension or count that must be at least one was zero.
    #[error("setting `{field}` must be at least 1")]
    NonPositive {
        /// Name of the offending setting.
        field: &'static str,
    },
    /// The chunk side could produce more vertices than a 16-bit index buffer holds.
    #[error(
        "chunk side {side} can emit up to {worst_case_vertices} vertices, above the budget of {budget}"
    )]
    VertexBudget {
        /// Configured voxels per chunk side.
        side: u32,
        /// Vertices a worst-case (checkerboard) chunk would emit.
        worst_case_vertices: u64,
        /// The per-chunk vertex ceiling.
        budget: usize,
    },
    /// A setting above the largest value the engine supports.
    #[error("setting `{field}` is {value}, above the maximum of {max}")]
    OutOfRange {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured value.
        value: u64,
        /// Largest accepted value.
        max: u64,
    },
    /// Terrain noise parameters out of range.
    #[error("invalid noise setting `{field}`: {reason}")]
    InvalidNoise {
        /// Name of the offending setting.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The settings file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON for [`Settings`](super::settings::Settings).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Violations of the chunk registry's key uniqueness.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two chunks claimed the same coordinate. Indicates a planner or reconciler bug.
    #[error("chunk {0} is already resident")]
    Collision(ChunkCoordinate),
}

/// Failures while turning a chunk into mesh buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Post-cull geometry does not fit the per-chunk vertex budget.
    #[error("chunk {coordinate} needs {vertices} vertices, above the budget of {budget}")]
    VertexBudgetExceeded {
        /// Chunk being meshed.
        coordinate: ChunkCoordinate,
        /// Vertices the chunk would emit.
        vertices: usize,
        /// The per-chunk vertex ceiling.
        budget: usize,
    },
    /// A face-generation worker panicked; the whole build is discarded.
    #[error("face worker for chunk {coordinate} panicked")]
    WorkerPanicked {
        /// Chunk being meshed.
        coordinate: ChunkCoordinate,
    },
    /// The chunk was evicted before its mesh task ran.
    #[error("chunk {0} is not resident")]
    ChunkNotResident(ChunkCoordinate),
    /// The registry lock was poisoned.
    #[error(transparent)]
    LockPoisoned(#[from] LockPoisoned),
}

impl MeshError {
    /// Whether retrying the build on a later tick can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MeshError::WorkerPanicked { .. })
    }
}

/// Errors surfaced by the streaming driver.
#[derive(Error, Debug)]
pub enum StreamingError {
    /// Invalid settings.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Registry invariant violated during reconciliation.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A mesh build failed in a way retrying cannot fix.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// The registry lock was poisoned.
    #[error(transparent)]
    LockPoisoned(#[from] LockPoisoned),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_worker_panics_are_retryable() {
        let coordinate = ChunkCoordinate::new(1, 2, 3);
        assert!(MeshError::WorkerPanicked { coordinate }.is_retryable());
        assert!(!MeshError::ChunkNotResident(coordinate).is_retryable());
        assert!(!MeshError::VertexBudgetExceeded {
            coordinate,
            vertices: 65_004,
            budget: 65_000,
        }
        .is_retryable());
    }

    #[test]
    fn collision_message_names_the_coordinate() {
        let err = RegistryError::Collision(ChunkCoordinate::new(-1, 0, 4));
        assert_eq!(err.to_string(), "chunk (-1, 0, 4) is already resident");
    }
}
