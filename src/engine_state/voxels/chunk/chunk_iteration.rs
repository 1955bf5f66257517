//! # Chunk Iteration Module
//!
//! Iteration over the solid cells of a [`VoxelGrid`], skipping empty space by
//! scanning only the set bits of the solidity vector.

use bitvec::order::Lsb0;
use bitvec::slice::IterOnes;
use cgmath::Point3;

use super::VoxelGrid;
use crate::engine_state::voxels::coordinates::VoxelCoordinate;

/// Yields the local coordinate of every solid cell in storage order.
pub struct SolidVoxelIterator<'a> {
    /// Cells along each chunk side
    side: usize,
    /// Indices of set bits in the solidity vector
    ones: IterOnes<'a, usize, Lsb0>,
}

impl<'a> SolidVoxelIterator<'a> {
    /// Creates an iterator over the solid cells of `grid`.
    pub fn new(grid: &'a VoxelGrid) -> Self {
        SolidVoxelIterator {
            side: grid.side,
            ones: grid.solid.iter_ones(),
        }
    }
}

impl Iterator for SolidVoxelIterator<'_> {
    type Item = VoxelCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.ones.next()?;
        let plane = self.side * self.side;
        Some(Point3::new(
            (index % self.side) as i32,
            ((index % plane) / self.side) as i32,
            (index / plane) as i32,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ones.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::super::chunk_creation::VoxelGridBuilder;
    use cgmath::Point3;

    #[test]
    fn yields_exactly_the_solid_cells() {
        let side = 3;
        let mut builder = VoxelGridBuilder::new(side);
        for z in 0..side {
            for y in 0..side {
                for x in 0..side {
                    builder.push((x + y + z) % 4 == 0);
                }
            }
        }
        let grid = builder.finish();

        let solid: Vec<_> = grid.iter_solid().collect();
        assert_eq!(solid.len(), grid.solid_count());
        assert!(solid.iter().all(|p| (p.x + p.y + p.z) % 4 == 0));
        assert!(solid.contains(&Point3::new(2, 2, 0)));
        assert!(solid.contains(&Point3::new(0, 0, 0)));
    }
}
