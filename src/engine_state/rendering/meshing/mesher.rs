//! Face culling and mesh assembly.
//!
//! [`build_mesh`] runs in four passes over a chunk:
//!
//! 1. **Face masks**: for every solid voxel, a 6-bit mask of the faces whose
//!    neighbour (possibly in an adjacent chunk) is not solid.
//! 2. **Offsets**: an exclusive prefix sum over the mask popcounts, giving
//!    every voxel a unique, contiguous range of quad slots.
//! 3. **Budget**: the total vertex count is checked before anything is
//!    allocated for geometry.
//! 4. **Emission**: each voxel writes its quads into its own slots, and the
//!    quads are flattened into [`MeshBuffers`].
//!
//! Passes 1 and 4 can be split into z-slabs processed on scoped threads.
//! Every slab writes a disjoint slice of the output, so no locking is
//! needed. If any slab panics the whole build fails; a partial mesh is never
//! returned.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use super::{check_vertex_budget, face::Quad, MeshBuffers, VERTICES_PER_QUAD};
use crate::engine_state::{
    error::MeshError,
    voxels::{
        chunk::{ChunkData, VoxelGrid},
        coordinates::{ChunkCoordinate, VoxelCoordinate},
        face_direction::FaceDirection,
        registry::ChunkRegistry,
    },
};

/// A slab panicked; the payload is discarded.
#[derive(Debug)]
struct SlabPanicked;

/// Builds the mesh of `chunk`, consulting `registry` for neighbours across
/// chunk boundaries.
///
/// # Arguments
/// * `chunk` - The chunk to mesh
/// * `registry` - Resident chunks, read for boundary faces
/// * `fanout` - Number of threads the per-voxel passes are split across
///
/// # Errors
/// * [`MeshError::VertexBudgetExceeded`] if the culled mesh is too large
/// * [`MeshError::WorkerPanicked`] if a slab worker panicked
pub fn build_mesh(
    chunk: &ChunkData,
    registry: &ChunkRegistry,
    fanout: usize,
) -> Result<MeshBuffers, MeshError> {
    let coordinate = chunk.coordinate();
    let grid = chunk.voxels();
    let volume = grid.volume();
    let slab_cells = slab_cells(grid, fanout);
    let panicked = |_: SlabPanicked| MeshError::WorkerPanicked { coordinate };

    // Pass 1: exposed-face masks
    let mut masks = vec![0u8; volume];
    let mask_slabs = masks.chunks_mut(slab_cells).enumerate().collect();
    run_slabs(mask_slabs, |slab, masks| {
        let first = slab * slab_cells;
        for (offset, mask) in masks.iter_mut().enumerate() {
            *mask = face_mask(registry, coordinate, grid, grid.coordinate_of(first + offset));
        }
    })
    .map_err(panicked)?;

    // Pass 2: quad offsets
    let mut offsets = Vec::with_capacity(volume + 1);
    let mut total_quads = 0usize;
    for mask in &masks {
        offsets.push(total_quads);
        total_quads += mask.count_ones() as usize;
    }
    offsets.push(total_quads);

    // Pass 3: budget
    check_vertex_budget(coordinate, total_quads * VERTICES_PER_QUAD)?;

    // Pass 4: emission
    let mut quads = vec![Quad::default(); total_quads];
    let mut quad_slabs = Vec::new();
    let mut remaining = quads.as_mut_slice();
    let mut first = 0;
    while first < volume {
        let last = (first + slab_cells).min(volume);
        let slab_quads = offsets[last] - offsets[first];
        let (slab, rest) = std::mem::take(&mut remaining).split_at_mut(slab_quads);
        quad_slabs.push((first, slab));
        remaining = rest;
        first = last;
    }
    let masks = &masks;
    let offsets = &offsets;
    run_slabs(quad_slabs, |first, quads| {
        let base = offsets[first];
        let last = (first + slab_cells).min(volume);
        for index in first..last {
            let mut slot = offsets[index] - base;
            let local = grid.coordinate_of(index);
            for direction in FaceDirection::all() {
                if masks[index] & direction.bit() != 0 {
                    quads[slot] = Quad::new(local, direction);
                    slot += 1;
                }
            }
        }
    })
    .map_err(panicked)?;

    Ok(MeshBuffers::from_quads(&quads))
}

/// Exposed faces of the voxel at `local`, as a bitmask of
/// [`FaceDirection::bit`]s. Empty voxels have no faces.
fn face_mask(
    registry: &ChunkRegistry,
    coordinate: ChunkCoordinate,
    grid: &VoxelGrid,
    local: VoxelCoordinate,
) -> u8 {
    if !grid.is_solid(local) {
        return 0;
    }
    FaceDirection::all()
        .into_iter()
        .filter(|direction| !registry.is_solid_in(coordinate, grid, local + direction.offset()))
        .fold(0, |mask, direction| mask | direction.bit())
}

/// Cells per slab when splitting a grid into `fanout` z-slabs.
fn slab_cells(grid: &VoxelGrid, fanout: usize) -> usize {
    let side = grid.side().max(1);
    let layers = side.div_ceil(fanout.max(1));
    (layers * side * side).max(1)
}

/// Runs `work` once per slab. A single slab runs on the calling thread;
/// more are spread across scoped threads.
fn run_slabs<K, T, F>(slabs: Vec<(K, &mut [T])>, work: F) -> Result<(), SlabPanicked>
where
    K: Send,
    T: Send,
    F: Fn(K, &mut [T]) + Sync,
{
    if slabs.len() <= 1 {
        return panic::catch_unwind(AssertUnwindSafe(|| {
            for (key, slab) in slabs {
                work(key, slab);
            }
        }))
        .map_err(|_| SlabPanicked);
    }

    let work = &work;
    thread::scope(|scope| {
        let handles: Vec<_> = slabs
            .into_iter()
            .map(|(key, slab)| scope.spawn(move || work(key, slab)))
            .collect();

        // Join every handle so the scope itself never re-panics
        handles
            .into_iter()
            .map(|handle| handle.join())
            .fold(Ok(()), |result, joined| result.and(joined.map_err(|_| SlabPanicked)))
    })
}
