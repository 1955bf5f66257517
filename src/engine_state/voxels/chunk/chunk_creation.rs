//! # Chunk Creation Module
//!
//! Push-order builder for a chunk's solidity bits.
//!
//! Cells are pushed with X varying fastest, then Y, then Z, which is the
//! same order [`VoxelGrid::index`](super::VoxelGrid::index) linearizes them
//! in. The builder only tracks a write cursor, so filling a chunk is a single
//! sequential pass over the bit vector.

use bitvec::vec::BitVec;

use super::VoxelGrid;

/// Builds a [`VoxelGrid`] one cell at a time in storage order.
pub struct VoxelGridBuilder {
    /// Cells along each chunk side
    side: usize,
    /// Solidity bits pushed so far
    solid: BitVec,
}

impl VoxelGridBuilder {
    /// Creates an empty builder for a chunk with `side` cells per axis.
    pub fn new(side: usize) -> Self {
        VoxelGridBuilder {
            side,
            solid: BitVec::with_capacity(side * side * side),
        }
    }

    /// Appends the next cell's solidity.
    pub fn push(&mut self, is_solid: bool) {
        self.solid.push(is_solid);
    }

    /// Cells pushed so far.
    pub fn len(&self) -> usize {
        self.solid.len()
    }

    /// Whether nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.solid.is_empty()
    }

    /// Finalizes the grid. Cells never pushed are empty.
    pub fn finish(mut self) -> VoxelGrid {
        let volume = self.side * self.side * self.side;
        self.solid.resize(volume, false);
        VoxelGrid {
            side: self.side,
            solid: self.solid,
        }
    }
}
