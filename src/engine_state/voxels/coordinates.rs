//! # Coordinates Module
//!
//! Chunk-space and voxel-space coordinate types.
//!
//! * [`ChunkCoordinate`] - integer position of a chunk in chunk space (not world units)
//! * [`VoxelCoordinate`] - integer position of a voxel local to one chunk
//!
//! A voxel coordinate is only meaningful together with the chunk it belongs
//! to. Neighbour queries may build local coordinates one step outside
//! `[0, N)`; the registry translates those into the adjacent chunk.

use std::cmp::Ordering;
use std::fmt;

use cgmath::{Point3, Vector3};

use crate::engine_state::settings::Settings;

/// A voxel position local to one chunk. Valid cells lie in `[0, N)` per axis.
pub type VoxelCoordinate = Point3<i32>;

/// Identifies a chunk by its integer position in chunk space.
///
/// Immutable and compared by value, so it serves directly as a registry key.
/// The total order (by `x`, then `y`, then `z`) exists so that reconciliation
/// can walk coordinates in a stable sequence.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ChunkCoordinate(Point3<i32>);

impl ChunkCoordinate {
    /// Creates a chunk coordinate from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkCoordinate(Point3::new(x, y, z))
    }

    /// The chunk-space X component.
    pub fn x(&self) -> i32 {
        self.0.x
    }

    /// The chunk-space Y component.
    pub fn y(&self) -> i32 {
        self.0.y
    }

    /// The chunk-space Z component.
    pub fn z(&self) -> i32 {
        self.0.z
    }

    /// The underlying point.
    pub fn as_point(&self) -> Point3<i32> {
        self.0
    }

    /// The coordinate displaced by `offset` chunks.
    pub fn offset(&self, offset: Vector3<i32>) -> Self {
        ChunkCoordinate(self.0 + offset)
    }

    /// The six axis-aligned neighbours (no diagonals).
    pub fn neighbors(&self) -> [ChunkCoordinate; 6] {
        [
            self.offset(Vector3::new(1, 0, 0)),
            self.offset(Vector3::new(-1, 0, 0)),
            self.offset(Vector3::new(0, 1, 0)),
            self.offset(Vector3::new(0, -1, 0)),
            self.offset(Vector3::new(0, 0, 1)),
            self.offset(Vector3::new(0, 0, -1)),
        ]
    }

    /// Number of axis-aligned hops between two chunks.
    pub fn manhattan_distance(&self, other: &ChunkCoordinate) -> u32 {
        (self.0.x - other.0.x).unsigned_abs()
            + (self.0.y - other.0.y).unsigned_abs()
            + (self.0.z - other.0.z).unsigned_abs()
    }

    /// The chunk containing a world-space focus point.
    ///
    /// Computed as `floor(position / (N * blocksPerMeter))` per axis.
    pub fn from_focus(position: Point3<f32>, settings: &Settings) -> Self {
        let divisor = (settings.voxels_per_chunk_side * settings.blocks_per_meter) as f32;
        ChunkCoordinate::new(
            (position.x / divisor).floor() as i32,
            (position.y / divisor).floor() as i32,
            (position.z / divisor).floor() as i32,
        )
    }

    /// World-space position of this chunk's local origin voxel.
    pub fn world_origin(&self, settings: &Settings) -> Point3<f32> {
        let size = settings.chunk_world_size();
        Point3::new(
            self.0.x as f32 * size,
            self.0.y as f32 * size,
            self.0.z as f32 * size,
        )
    }
}

impl Ord for ChunkCoordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0.x, self.0.y, self.0.z).cmp(&(other.0.x, other.0.y, other.0.z))
    }
}

impl PartialOrd for ChunkCoordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

impl From<(i32, i32, i32)> for ChunkCoordinate {
    fn from(value: (i32, i32, i32)) -> Self {
        ChunkCoordinate::new(value.0, value.1, value.2)
    }
}

impl From<Point3<i32>> for ChunkCoordinate {
    fn from(value: Point3<i32>) -> Self {
        ChunkCoordinate(value)
    }
}
