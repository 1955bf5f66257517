//! # Chunk Module
//!
//! Per-chunk voxel storage and the chunk lifecycle state.
//!
//! ## Memory Layout
//!
//! A [`VoxelGrid`] holds one solidity bit per cell in a `BitVec`, laid out
//! with X varying fastest, then Y, then Z:
//!
//! ```text
//! index = x + N * y + N² * z
//! ```
//!
//! A 16³ chunk therefore costs 512 bytes of voxel data. The grid is filled
//! once from the height field when the chunk is created and never edited
//! afterwards; chunks that leave and re-enter the resident set are rebuilt
//! from scratch.
//!
//! ### Performance Characteristics
//! - **Solidity Check**: O(1) - a single bit lookup
//! - **Fill**: one height sample per column, N bit pushes per column
//! - **Solid Iteration**: proportional to the number of set bits

use std::sync::Arc;

use bitvec::vec::BitVec;
use cgmath::Point3;
use chunk_creation::VoxelGridBuilder;
use chunk_iteration::SolidVoxelIterator;

use super::coordinates::{ChunkCoordinate, VoxelCoordinate};
use super::height_field::HeightField;
use crate::engine_state::settings::Settings;

pub mod chunk_creation;
pub mod chunk_iteration;

/// Where a chunk stands in the streaming lifecycle.
///
/// ```text
/// AwaitDraw --(renderer assigned)--> Done
/// Done/Keep --(planning pass)--> Keep | Remove
/// Remove --(renderer freed)--> deleted from the registry
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Freshly generated, waiting for a renderer.
    AwaitDraw,
    /// Still in the wanted set after the latest planning pass.
    Keep,
    /// Left the wanted set; deleted once its renderer is freed.
    Remove,
    /// Assigned to a renderer.
    Done,
}

/// The dense N×N×N solidity grid of one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    /// Cells along each side
    side: usize,
    /// One bit per cell, `true` when solid
    solid: BitVec,
}

impl VoxelGrid {
    /// Fills a grid for the chunk at `coordinate` from the height field.
    ///
    /// A cell is solid when its world Y lies at or below the column's terrain
    /// height, where a height sample in `[0, 1]` spans
    /// `maxHeightInChunks * N / blocksPerMeter` world units. Each column is
    /// sampled once.
    pub fn fill<H: HeightField + ?Sized>(
        coordinate: ChunkCoordinate,
        settings: &Settings,
        height_field: &H,
    ) -> Self {
        let side = settings.side();
        let origin = coordinate.world_origin(settings);
        let scale = settings.blocks_per_meter as f32;
        let max_height = settings.max_terrain_height();

        let mut column_heights = Vec::with_capacity(side * side);
        for z in 0..side {
            for x in 0..side {
                let world_x = origin.x + x as f32 / scale;
                let world_z = origin.z + z as f32 / scale;
                column_heights.push(height_field.sample(world_x, world_z) * max_height);
            }
        }

        let mut builder = VoxelGridBuilder::new(side);
        for z in 0..side {
            for y in 0..side {
                let world_y = origin.y + y as f32 / scale;
                for x in 0..side {
                    builder.push(world_y <= column_heights[x + side * z]);
                }
            }
        }
        builder.finish()
    }

    /// A grid with every cell set to `solid`.
    pub fn uniform(side: usize, solid: bool) -> Self {
        VoxelGrid {
            side,
            solid: BitVec::repeat(solid, side * side * side),
        }
    }

    /// Cells along each side.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of cells.
    pub fn volume(&self) -> usize {
        self.solid.len()
    }

    /// Whether `local` lies inside `[0, N)` on every axis.
    pub fn contains(&self, local: VoxelCoordinate) -> bool {
        let side = self.side as i32;
        (0..side).contains(&local.x) && (0..side).contains(&local.y) && (0..side).contains(&local.z)
    }

    /// Storage index of an in-range cell.
    pub fn index(&self, local: VoxelCoordinate) -> usize {
        local.x as usize + self.side * local.y as usize + self.side * self.side * local.z as usize
    }

    /// Local coordinate of a storage index.
    pub fn coordinate_of(&self, index: usize) -> VoxelCoordinate {
        let plane = self.side * self.side;
        Point3::new(
            (index % self.side) as i32,
            ((index % plane) / self.side) as i32,
            (index / plane) as i32,
        )
    }

    /// Solidity of a cell in this chunk. Out-of-range cells read as empty;
    /// use the registry to look across chunk boundaries.
    pub fn is_solid(&self, local: VoxelCoordinate) -> bool {
        self.contains(local) && self.solid[self.index(local)]
    }

    /// Number of solid cells.
    pub fn solid_count(&self) -> usize {
        self.solid.count_ones()
    }

    /// Iterates the local coordinates of all solid cells.
    pub fn iter_solid(&self) -> SolidVoxelIterator<'_> {
        SolidVoxelIterator::new(self)
    }
}

/// A resident chunk: its coordinate, voxels and lifecycle state.
///
/// The voxel grid is shared behind an `Arc` and immutable once filled, so
/// mesh workers can hold onto it without copying.
#[derive(Clone, Debug)]
pub struct ChunkData {
    /// Position of this chunk in chunk space
    coordinate: ChunkCoordinate,
    /// Solidity grid, filled at construction
    voxels: Arc<VoxelGrid>,
    /// Lifecycle state, changed only by reconciliation
    pub state: ChunkState,
    /// Unique id of this construction; a regenerated chunk gets a new one
    generation: u64,
}

impl ChunkData {
    /// Generates a new chunk in state [`ChunkState::AwaitDraw`].
    pub fn generate<H: HeightField + ?Sized>(
        coordinate: ChunkCoordinate,
        settings: &Settings,
        height_field: &H,
        generation: u64,
    ) -> Self {
        Self::from_grid(
            coordinate,
            VoxelGrid::fill(coordinate, settings, height_field),
            generation,
        )
    }

    /// Wraps an already filled grid in state [`ChunkState::AwaitDraw`].
    pub fn from_grid(coordinate: ChunkCoordinate, voxels: VoxelGrid, generation: u64) -> Self {
        ChunkData {
            coordinate,
            voxels: Arc::new(voxels),
            state: ChunkState::AwaitDraw,
            generation,
        }
    }

    /// Position of this chunk in chunk space.
    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    /// The chunk's voxel grid.
    pub fn voxels(&self) -> &VoxelGrid {
        &self.voxels
    }

    /// A shared handle to the voxel grid.
    pub fn voxels_shared(&self) -> Arc<VoxelGrid> {
        self.voxels.clone()
    }

    /// Unique id of this construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::height_field::ConstantHeightField;

    #[test]
    fn flat_terrain_fills_up_to_the_threshold() {
        // 0.5 * 4 chunks * 16 voxels = world height 32.
        let settings = Settings::default();
        let field = ConstantHeightField(0.5);

        let below = VoxelGrid::fill(ChunkCoordinate::new(0, 1, 0), &settings, &field);
        assert_eq!(below.solid_count(), 16 * 16 * 16);

        let straddling = VoxelGrid::fill(ChunkCoordinate::new(3, 2, -1), &settings, &field);
        assert_eq!(straddling.solid_count(), 16 * 16);
        assert!(straddling.is_solid(Point3::new(5, 0, 9)));
        assert!(!straddling.is_solid(Point3::new(5, 1, 9)));

        let above = VoxelGrid::fill(ChunkCoordinate::new(0, 3, 0), &settings, &field);
        assert_eq!(above.solid_count(), 0);
    }

    #[test]
    fn blocks_per_meter_compresses_world_positions() {
        // With 2 blocks per meter a chunk spans 8 world units and the terrain
        // threshold is 0.5 * 4 * 8 = 16, i.e. chunk y = 2 starts exactly on it.
        let settings = Settings {
            blocks_per_meter: 2,
            ..Settings::default()
        };
        let grid = VoxelGrid::fill(ChunkCoordinate::new(0, 2, 0), &settings, &ConstantHeightField(0.5));
        assert_eq!(grid.solid_count(), 16 * 16);
    }

    #[test]
    fn out_of_range_cells_read_as_empty() {
        let grid = VoxelGrid::uniform(4, true);
        assert!(grid.is_solid(Point3::new(3, 3, 3)));
        assert!(!grid.is_solid(Point3::new(4, 0, 0)));
        assert!(!grid.is_solid(Point3::new(0, -1, 0)));
    }

    #[test]
    fn index_and_coordinate_round_trip() {
        let grid = VoxelGrid::uniform(5, false);
        for index in [0, 4, 5, 24, 25, 124] {
            assert_eq!(grid.index(grid.coordinate_of(index)), index);
        }
    }

    #[test]
    fn new_chunks_await_draw() {
        let chunk = ChunkData::generate(
            ChunkCoordinate::new(0, 0, 0),
            &Settings::default(),
            &ConstantHeightField(0.0),
            7,
        );
        assert_eq!(chunk.state, ChunkState::AwaitDraw);
        assert_eq!(chunk.generation(), 7);
        // Height 0 still makes the y = 0 layer solid.
        assert_eq!(chunk.voxels().solid_count(), 16 * 16);
    }
}
