use std::collections::HashSet;

use proptest::prelude::*;
use voxel_streaming_engine::engine_state::{
    streaming::{expected_count, ChunkSetPlanner, VerticalPolicy},
    voxels::coordinates::ChunkCoordinate,
};

fn focus() -> impl Strategy<Value = ChunkCoordinate> {
    (-1_000i32..=1_000, -1_000i32..=1_000, -1_000i32..=1_000)
        .prop_map(|(x, y, z)| ChunkCoordinate::new(x, y, z))
}

fn radius() -> impl Strategy<Value = u32> {
    0u32..=6
}

proptest! {
    // Membership is exactly the Manhattan ball, focus included for r >= 1
    #[test]
    fn plan_is_the_manhattan_ball(focus in focus(), radius in radius()) {
        let plan = ChunkSetPlanner::default().plan(focus, radius);
        prop_assert_eq!(plan.len(), expected_count(radius));
        prop_assert_eq!(plan.contains(&focus), radius >= 1);
        for coordinate in &plan {
            prop_assert!(coordinate.manhattan_distance(&focus) <= radius);
        }
    }

    // Every neighbour of a member that is still within reach is a member
    #[test]
    fn plan_is_closed_under_reachable_hops(focus in focus(), radius in 1u32..=5) {
        let plan = ChunkSetPlanner::default().plan(focus, radius);
        for coordinate in &plan {
            for neighbor in coordinate.neighbors() {
                if neighbor.manhattan_distance(&focus) <= radius {
                    prop_assert!(plan.contains(&neighbor));
                }
            }
        }
    }

    // Same inputs, same set; translating the focus translates the set
    #[test]
    fn plan_is_deterministic_and_translation_invariant(
        focus in focus(),
        shift in (-50i32..=50, -50i32..=50, -50i32..=50),
        radius in radius(),
    ) {
        let planner = ChunkSetPlanner::default();
        prop_assert_eq!(planner.plan(focus, radius), planner.plan(focus, radius));

        let offset = cgmath::Vector3::new(shift.0, shift.1, shift.2);
        let moved: HashSet<_> = planner
            .plan(focus, radius)
            .into_iter()
            .map(|coordinate| coordinate.offset(offset))
            .collect();
        prop_assert_eq!(moved, planner.plan(focus.offset(offset), radius));
    }

    // Suppression only removes below-ground layers
    #[test]
    fn suppression_is_a_filter(focus in focus(), radius in radius()) {
        let full = ChunkSetPlanner::new(VerticalPolicy::Unbounded).plan(focus, radius);
        let above = ChunkSetPlanner::new(VerticalPolicy::AtOrAboveGround).plan(focus, radius);
        let expected: HashSet<_> = full.into_iter().filter(|c| c.y() >= 0).collect();
        prop_assert_eq!(above, expected);
    }
}
