//! # Chunk Registry Module
//!
//! The `ChunkRegistry` maps chunk coordinates to resident chunk data. It is
//! the single source of truth for which chunks exist, and the only channel
//! through which a voxel can see into an adjacent chunk.
//!
//! ## Ownership
//!
//! The registry is owned by the streaming engine and passed explicitly to
//! whatever needs it: reconciliation takes it mutably, mesh workers read it
//! through a shared lock. Nothing reaches it as ambient global state.
//!
//! ## Cross-Chunk Queries
//!
//! [`ChunkRegistry::is_solid`] accepts local coordinates one step outside
//! `[0, N)`. Out-of-range axes are wrapped into the neighbouring chunk
//! (`-1 → N-1`, `N → 0`) and that chunk is looked up. A neighbour that is
//! not resident reads as empty, so boundary faces are drawn rather than
//! silently missing while neighbours load.

use std::collections::HashMap;

use cgmath::{Point3, Vector3};

use super::chunk::{ChunkData, VoxelGrid};
use super::coordinates::{ChunkCoordinate, VoxelCoordinate};
use crate::engine_state::error::RegistryError;

/// Mapping from chunk coordinate to resident chunk data. Keys are unique;
/// iteration order is unspecified.
#[derive(Default)]
pub struct ChunkRegistry {
    /// Resident chunks by coordinate
    chunks: HashMap<ChunkCoordinate, ChunkData>,
    /// Next value handed out by `next_generation`
    generation_counter: u64,
}

impl ChunkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with room for `capacity` chunks.
    pub fn with_capacity(capacity: usize) -> Self {
        ChunkRegistry {
            chunks: HashMap::with_capacity(capacity),
            generation_counter: 0,
        }
    }

    /// Hands out a fresh construction id for a new [`ChunkData`].
    pub fn next_generation(&mut self) -> u64 {
        self.generation_counter += 1;
        self.generation_counter
    }

    /// Inserts a chunk under its own coordinate.
    ///
    /// # Errors
    /// Returns [`RegistryError::Collision`] if the coordinate is already
    /// resident. The existing chunk is left untouched.
    pub fn insert(&mut self, chunk: ChunkData) -> Result<(), RegistryError> {
        use std::collections::hash_map::Entry;

        match self.chunks.entry(chunk.coordinate()) {
            Entry::Occupied(entry) => Err(RegistryError::Collision(*entry.key())),
            Entry::Vacant(entry) => {
                entry.insert(chunk);
                Ok(())
            }
        }
    }

    /// Removes and returns the chunk at `coordinate`, if resident.
    pub fn remove(&mut self, coordinate: ChunkCoordinate) -> Option<ChunkData> {
        self.chunks.remove(&coordinate)
    }

    /// The chunk at `coordinate`, if resident.
    pub fn lookup(&self, coordinate: ChunkCoordinate) -> Option<&ChunkData> {
        self.chunks.get(&coordinate)
    }

    /// Mutable access to the chunk at `coordinate`, if resident.
    pub fn lookup_mut(&mut self, coordinate: ChunkCoordinate) -> Option<&mut ChunkData> {
        self.chunks.get_mut(&coordinate)
    }

    /// Whether a chunk is resident at `coordinate`.
    pub fn contains(&self, coordinate: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coordinate)
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is resident.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Coordinates of all resident chunks, sorted.
    pub fn coordinates(&self) -> Vec<ChunkCoordinate> {
        let mut coordinates: Vec<_> = self.chunks.keys().copied().collect();
        coordinates.sort();
        coordinates
    }

    /// Iterates all resident chunks.
    pub fn iter(&self) -> impl Iterator<Item = &ChunkData> {
        self.chunks.values()
    }

    /// Iterates all resident chunks mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChunkData> {
        self.chunks.values_mut()
    }

    /// Solidity of `local` relative to `chunk`, looking into neighbouring
    /// chunks when `local` lies outside `[0, N)`.
    ///
    /// Cells in chunks that are not resident read as not solid.
    pub fn is_solid(&self, chunk: &ChunkData, local: VoxelCoordinate) -> bool {
        self.is_solid_in(chunk.coordinate(), chunk.voxels(), local)
    }

    /// Same as [`is_solid`](Self::is_solid), for a grid not necessarily held
    /// by this registry.
    pub fn is_solid_in(
        &self,
        coordinate: ChunkCoordinate,
        grid: &VoxelGrid,
        local: VoxelCoordinate,
    ) -> bool {
        if grid.contains(local) {
            return grid.is_solid(local);
        }

        let side = grid.side() as i32;
        let chunk_offset = Vector3::new(
            local.x.div_euclid(side),
            local.y.div_euclid(side),
            local.z.div_euclid(side),
        );
        let wrapped = Point3::new(
            local.x.rem_euclid(side),
            local.y.rem_euclid(side),
            local.z.rem_euclid(side),
        );

        self.lookup(coordinate.offset(chunk_offset))
            .is_some_and(|neighbor| neighbor.voxels().is_solid(wrapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::ChunkState;

    fn solid_chunk(registry: &mut ChunkRegistry, coordinate: ChunkCoordinate, side: usize) {
        let generation = registry.next_generation();
        registry
            .insert(ChunkData::from_grid(coordinate, VoxelGrid::uniform(side, true), generation))
            .unwrap();
    }

    #[test]
    fn insert_refuses_to_overwrite() {
        let mut registry = ChunkRegistry::new();
        let coordinate = ChunkCoordinate::new(0, 0, 0);
        solid_chunk(&mut registry, coordinate, 2);
        registry.lookup_mut(coordinate).unwrap().state = ChunkState::Done;

        let duplicate = ChunkData::from_grid(coordinate, VoxelGrid::uniform(2, false), 99);
        assert_eq!(
            registry.insert(duplicate),
            Err(RegistryError::Collision(coordinate))
        );
        let kept = registry.lookup(coordinate).unwrap();
        assert_eq!(kept.state, ChunkState::Done);
        assert_eq!(kept.voxels().solid_count(), 8);
    }

    #[test]
    fn boundary_queries_wrap_into_the_neighbor() {
        // Chunk (0,0,0) is solid; chunk (1,0,0) is empty. From (1,0,0), local
        // (-1, 0, 0) is (N-1, 0, 0) of chunk (0,0,0).
        let side = 4;
        let mut registry = ChunkRegistry::new();
        solid_chunk(&mut registry, ChunkCoordinate::new(0, 0, 0), side);
        registry
            .insert(ChunkData::from_grid(
                ChunkCoordinate::new(1, 0, 0),
                VoxelGrid::uniform(side, false),
                registry.generation_counter + 1,
            ))
            .unwrap();

        let right = registry.lookup(ChunkCoordinate::new(1, 0, 0)).unwrap();
        assert!(registry.is_solid(right, Point3::new(-1, 0, 0)));
        assert!(registry.is_solid(right, Point3::new(-1, 3, 2)));
        assert!(!registry.is_solid(right, Point3::new(0, 0, 0)));

        let left = registry.lookup(ChunkCoordinate::new(0, 0, 0)).unwrap();
        assert!(!registry.is_solid(left, Point3::new(side as i32, 0, 0)));
    }

    #[test]
    fn missing_neighbors_read_as_empty() {
        let mut registry = ChunkRegistry::new();
        solid_chunk(&mut registry, ChunkCoordinate::new(0, 0, 0), 4);
        let chunk = registry.lookup(ChunkCoordinate::new(0, 0, 0)).unwrap();
        assert!(!registry.is_solid(chunk, Point3::new(0, -1, 0)));
        assert!(!registry.is_solid(chunk, Point3::new(0, 0, 4)));
        assert!(registry.is_solid(chunk, Point3::new(0, 0, 3)));
    }

    #[test]
    fn generations_are_unique() {
        let mut registry = ChunkRegistry::new();
        let a = registry.next_generation();
        let b = registry.next_generation();
        assert_ne!(a, b);
    }

    #[test]
    fn coordinates_are_sorted() {
        let mut registry = ChunkRegistry::new();
        for c in [(2, 0, 0), (-1, 0, 0), (0, 5, 0)] {
            solid_chunk(&mut registry, c.into(), 1);
        }
        assert_eq!(
            registry.coordinates(),
            vec![
                ChunkCoordinate::new(-1, 0, 0),
                ChunkCoordinate::new(0, 5, 0),
                ChunkCoordinate::new(2, 0, 0),
            ]
        );
    }
}
