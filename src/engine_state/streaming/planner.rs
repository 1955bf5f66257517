//! # Chunk Set Planner
//!
//! Decides which chunk coordinates should be resident around a focus chunk.
//!
//! The wanted set is a flood-fill from the focus along the six axis-aligned
//! neighbour directions, at most `radius` hops deep. That is the Manhattan
//! ball `|dx| + |dy| + |dz| <= radius`: an octahedron, neither a sphere nor a
//! cube. A diagonal chunk such as `(1, 1, 1)` is three hops away and is
//! therefore outside a radius-2 plan.
//!
//! The traversal is an explicit breadth-first worklist, so deep radii cannot
//! overflow the stack, and the result is a set, so discovery order never
//! leaks into callers.
//!
//! A radius of zero plans nothing at all, not even the focus.

use std::collections::{HashSet, VecDeque};

use crate::engine_state::{settings::Settings, voxels::coordinates::ChunkCoordinate};

/// Which chunk layers a plan may contain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum VerticalPolicy {
    /// Every coordinate the flood-fill reaches.
    #[default]
    Unbounded,
    /// Only coordinates with `y >= 0`.
    AtOrAboveGround,
}

impl VerticalPolicy {
    /// Whether `coordinate` may be planned under this policy.
    pub fn allows(self, coordinate: ChunkCoordinate) -> bool {
        match self {
            VerticalPolicy::Unbounded => true,
            VerticalPolicy::AtOrAboveGround => coordinate.y() >= 0,
        }
    }
}

/// Computes wanted chunk sets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkSetPlanner {
    policy: VerticalPolicy,
}

impl ChunkSetPlanner {
    /// Creates a planner applying `policy` to its output.
    pub fn new(policy: VerticalPolicy) -> Self {
        ChunkSetPlanner { policy }
    }

    /// Creates a planner configured by `settings.suppress_below_ground`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(if settings.suppress_below_ground {
            VerticalPolicy::AtOrAboveGround
        } else {
            VerticalPolicy::Unbounded
        })
    }

    /// The vertical policy in effect.
    pub fn policy(&self) -> VerticalPolicy {
        self.policy
    }

    /// The coordinates within `radius` axis-aligned hops of `focus`.
    ///
    /// The vertical policy filters the result; it never changes which
    /// coordinates the flood-fill can reach.
    pub fn plan(&self, focus: ChunkCoordinate, radius: u32) -> HashSet<ChunkCoordinate> {
        if radius == 0 {
            return HashSet::new();
        }

        let mut visited = HashSet::with_capacity(expected_count(radius));
        let mut worklist = VecDeque::new();
        visited.insert(focus);
        worklist.push_back((focus, 0u32));

        while let Some((coordinate, depth)) = worklist.pop_front() {
            if depth == radius {
                continue;
            }
            for neighbor in coordinate.neighbors() {
                if visited.insert(neighbor) {
                    worklist.push_back((neighbor, depth + 1));
                }
            }
        }

        if self.policy != VerticalPolicy::Unbounded {
            visited.retain(|coordinate| self.policy.allows(*coordinate));
        }
        visited
    }
}

/// Size of an unfiltered plan of the given radius.
///
/// The Manhattan ball of radius `r` in three dimensions holds
/// `(2r + 1)(2r² + 2r + 3) / 3` points; radius 0 plans nothing. Saturates at
/// `usize::MAX`.
pub fn expected_count(radius: u32) -> usize {
    if radius == 0 {
        return 0;
    }
    let r = radius as u128;
    usize::try_from((2 * r + 1) * (2 * r * r + 2 * r + 3) / 3).unwrap_or(usize::MAX)
}
