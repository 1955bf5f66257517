//! Task for building a chunk's mesh in a background thread.
//!
//! The task holds a shared handle to the chunk registry rather than a copy
//! of the chunk, so boundary faces are culled against whatever neighbours
//! are resident when the build runs. Reconciliation never runs while mesh
//! tasks are in flight, so the registry seen by a build is stable.

use crate::{
    core::Shared,
    engine_state::{
        error::MeshError,
        rendering::meshing::{build_mesh, MeshBuffers},
        task_management::task::Task,
        voxels::{coordinates::ChunkCoordinate, registry::ChunkRegistry},
    },
};

/// Builds the mesh of one chunk for one renderer.
pub struct ChunkMeshTask {
    /// Registry the chunk and its neighbours are read from
    registry: Shared<ChunkRegistry>,
    /// Renderer the mesh is destined for
    renderer_id: usize,
    /// Chunk to mesh
    coordinate: ChunkCoordinate,
    /// Construction id the chunk had when the task was published
    generation: u64,
    /// Threads the per-voxel passes are split across
    fanout: usize,
    /// How many times this build has been tried, starting at 1
    attempt: u32,
}

impl ChunkMeshTask {
    /// Creates a new chunk mesh task.
    ///
    /// # Arguments
    /// * `registry` - Shared handle to the chunk registry
    /// * `renderer_id` - Renderer the mesh is destined for
    /// * `coordinate` - Chunk to mesh
    /// * `generation` - The chunk's construction id at publish time
    /// * `fanout` - Threads the per-voxel passes are split across
    pub fn new(
        registry: Shared<ChunkRegistry>,
        renderer_id: usize,
        coordinate: ChunkCoordinate,
        generation: u64,
        fanout: usize,
    ) -> Self {
        ChunkMeshTask {
            registry,
            renderer_id,
            coordinate,
            generation,
            fanout,
            attempt: 1,
        }
    }

    /// Marks this task as try number `attempt` of its build.
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    /// A fresh task for the same build, used to retry after a failure.
    pub fn retry(&self) -> Self {
        ChunkMeshTask::new(
            self.registry.clone(),
            self.renderer_id,
            self.coordinate,
            self.generation,
            self.fanout,
        )
        .with_attempt(self.attempt + 1)
    }

    /// Which try of this build the task is, starting at 1.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    fn build(&self) -> Result<MeshBuffers, MeshError> {
        let registry = self.registry.read()?;
        let chunk = registry
            .lookup(self.coordinate)
            .filter(|chunk| chunk.generation() == self.generation)
            .ok_or(MeshError::ChunkNotResident(self.coordinate))?;
        build_mesh(chunk, &registry, self.fanout)
    }
}

impl Task for ChunkMeshTask {
    type Output = ChunkMeshResult;

    fn process(&self) -> ChunkMeshResult {
        ChunkMeshResult {
            renderer_id: self.renderer_id,
            coordinate: self.coordinate,
            generation: self.generation,
            attempt: self.attempt,
            result: self.build(),
        }
    }
}

/// The outcome of a [`ChunkMeshTask`].
///
/// Carries enough identity for the driver to tell whether the target
/// renderer still wants this mesh.
#[derive(Debug)]
pub struct ChunkMeshResult {
    /// Renderer the mesh is destined for
    pub renderer_id: usize,
    /// Chunk that was meshed
    pub coordinate: ChunkCoordinate,
    /// Construction id of the meshed chunk
    pub generation: u64,
    /// Which try of the build this was, starting at 1
    pub attempt: u32,
    /// The mesh, or why it could not be built
    pub result: Result<MeshBuffers, MeshError>,
}
