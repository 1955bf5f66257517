use std::collections::HashSet;

use cgmath::Point3;
use voxel_streaming_engine::engine_state::{
    rendering::{HeadlessPresentation, RendererState},
    settings::Settings,
    streaming::{expected_count, ChunkSetPlanner, VerticalPolicy},
    voxels::{coordinates::ChunkCoordinate, height_field::ConstantHeightField},
};
use voxel_streaming_engine::StreamingEngine;

const MAX_TICKS: usize = 100_000;

/// Eight-voxel chunks at one voxel per metre: chunk (x, y, z) spans
/// `[8x, 8x + 8)` on each axis.
fn settings() -> Settings {
    Settings {
        voxels_per_chunk_side: 8,
        generation_radius_in_chunks: 2,
        mesh_workers: 3,
        ..Settings::default()
    }
}

/// A point in the middle of chunk `(x, y, z)`.
fn centre_of(x: i32, y: i32, z: i32) -> Point3<f32> {
    Point3::new(x as f32 * 8.0 + 4.0, y as f32 * 8.0 + 4.0, z as f32 * 8.0 + 4.0)
}

fn engine(settings: Settings) -> (StreamingEngine, HeadlessPresentation) {
    let presentation = HeadlessPresentation::new();
    let engine = StreamingEngine::new(settings, ConstantHeightField(0.5), presentation.clone()).unwrap();
    (engine, presentation)
}

fn resident(engine: &StreamingEngine) -> HashSet<ChunkCoordinate> {
    engine.registry().read().unwrap().coordinates().into_iter().collect()
}

#[test]
fn bootstrap_cycle_is_followed_by_the_full_radius() {
    let (mut engine, _) = engine(Settings {
        bootstrap_radius_in_chunks: Some(1),
        ..settings()
    });
    engine.set_focus(centre_of(0, 0, 0));

    let first = engine.tick().unwrap();
    let cycle = first.cycle.unwrap();
    assert_eq!(cycle.created, 7);
    assert_eq!(engine.registry().read().unwrap().len(), 7);
    assert!(!engine.is_idle());

    engine.run_until_idle(MAX_TICKS).unwrap();
    assert!(engine.is_idle());
    assert_eq!(engine.registry().read().unwrap().len(), 25);
    assert_eq!(engine.stats().cycles, 2);
    assert_eq!(engine.stats().chunks_created, 25);
    assert_eq!(engine.stats().renderers_spawned, 25);
}

#[test]
fn bootstrap_radius_at_or_above_full_is_ignored() {
    let (mut engine, _) = engine(Settings {
        bootstrap_radius_in_chunks: Some(3),
        ..settings()
    });
    engine.set_focus(centre_of(0, 0, 0));
    engine.run_until_idle(MAX_TICKS).unwrap();
    assert_eq!(engine.stats().cycles, 1);
    assert_eq!(engine.registry().read().unwrap().len(), expected_count(2));
}

#[test]
fn moving_one_chunk_recycles_the_trailing_shell() {
    let (mut engine, presentation) = engine(settings());
    engine.set_focus(centre_of(0, 0, 0));
    engine.run_until_idle(MAX_TICKS).unwrap();
    let before = engine.stats().clone();

    engine.set_focus(centre_of(1, 0, 0));
    engine.run_until_idle(MAX_TICKS).unwrap();
    let after = engine.stats();

    assert_eq!(after.chunks_evicted - before.chunks_evicted, 13);
    assert_eq!(after.chunks_created - before.chunks_created, 13);
    assert_eq!(after.renderers_recycled - before.renderers_recycled, 13);
    assert_eq!(after.renderers_spawned, before.renderers_spawned);
    // The ten kept chunks bordering the change are re-meshed too.
    assert_eq!(after.chunks_rebuilt - before.chunks_rebuilt, 10);
    assert_eq!(after.meshes_built - before.meshes_built, 23);

    assert_eq!(presentation.object_count(), 25);
    assert_eq!(presentation.visible_count(), 25);
    assert!(engine
        .renderers()
        .iter()
        .all(|renderer| renderer.state() == RendererState::Drawn));
}

#[test]
fn focus_changes_during_meshing_coalesce_into_one_cycle() {
    let (mut engine, _) = engine(Settings {
        generation_radius_in_chunks: 1,
        ..settings()
    });
    engine.set_focus(centre_of(0, 0, 0));
    let first = engine.tick().unwrap();
    assert!(first.cycle.is_some());
    assert!(first.in_flight > 0);
    let planned = resident(&engine);

    engine.set_focus(centre_of(1, 0, 0));
    engine.set_focus(centre_of(2, 0, 0));

    let mut cycles = 0;
    for _ in 0..MAX_TICKS {
        if engine.is_idle() {
            break;
        }
        let report = engine.tick().unwrap();
        match report.cycle {
            Some(_) => cycles += 1,
            None if cycles == 0 => assert_eq!(resident(&engine), planned),
            None => {}
        }
    }

    assert!(engine.is_idle());
    assert_eq!(cycles, 1);
    assert_eq!(engine.stats().cycles, 2);
    assert_eq!(
        resident(&engine),
        ChunkSetPlanner::default().plan(ChunkCoordinate::new(2, 0, 0), 1)
    );
    // Seven first-cycle meshes, six new chunks, and the kept (1, 0, 0) seam.
    assert_eq!(engine.stats().meshes_built, 14);
}

#[test]
fn resident_set_tracks_the_plan_after_a_walk() {
    let (mut engine, _) = engine(settings());
    let planner = ChunkSetPlanner::default();
    for (x, z) in [(0, 0), (1, 0), (3, 1), (3, 4), (-2, 4)] {
        engine.set_focus(centre_of(x, 0, z));
        engine.run_until_idle(MAX_TICKS).unwrap();
        let focus = ChunkCoordinate::new(x, 0, z);
        assert_eq!(resident(&engine), planner.plan(focus, 2));

        let drawn: HashSet<_> = engine
            .renderers()
            .iter()
            .filter(|renderer| renderer.is_visible())
            .filter_map(|renderer| renderer.chunk())
            .collect();
        assert_eq!(drawn, resident(&engine));
    }
}

#[test]
fn re_entering_chunk_is_regenerated() {
    let (mut engine, _) = engine(settings());
    let edge = ChunkCoordinate::new(-2, 0, 0);
    engine.set_focus(centre_of(0, 0, 0));
    engine.run_until_idle(MAX_TICKS).unwrap();
    let first = engine.registry().read().unwrap().lookup(edge).unwrap().generation();

    engine.set_focus(centre_of(1, 0, 0));
    engine.run_until_idle(MAX_TICKS).unwrap();
    assert!(!engine.registry().read().unwrap().contains(edge));

    engine.set_focus(centre_of(0, 0, 0));
    engine.run_until_idle(MAX_TICKS).unwrap();
    let second = engine.registry().read().unwrap().lookup(edge).unwrap().generation();
    assert!(second > first);
}

#[test]
fn descending_to_ground_parks_below_ground_renderers() {
    let (mut engine, presentation) = engine(Settings {
        suppress_below_ground: true,
        ..settings()
    });

    engine.set_focus(centre_of(0, 5, 0));
    engine.run_until_idle(MAX_TICKS).unwrap();
    assert_eq!(presentation.visible_count(), 25);

    engine.set_focus(centre_of(0, 0, 0));
    let report = loop {
        if let Some(cycle) = engine.tick().unwrap().cycle {
            break cycle;
        }
    };
    assert_eq!(report.evicted, 25);
    assert_eq!(report.created, 19);
    assert_eq!(report.recycled, 19);
    assert_eq!(report.parked, 6);
    assert_eq!(report.spawned, 0);

    engine.run_until_idle(MAX_TICKS).unwrap();
    let wanted = ChunkSetPlanner::new(VerticalPolicy::AtOrAboveGround).plan(ChunkCoordinate::new(0, 0, 0), 2);
    assert_eq!(resident(&engine), wanted);
    assert!(resident(&engine).iter().all(|coordinate| coordinate.y() >= 0));
    assert_eq!(presentation.object_count(), 25);
    assert_eq!(presentation.visible_count(), 19);
}

#[test]
fn drawn_objects_sit_at_their_chunk_origin() {
    let (mut engine, presentation) = engine(Settings {
        blocks_per_meter: 2,
        ..settings()
    });
    // Four-metre chunks.
    engine.set_focus(Point3::new(-1.0, 0.5, 0.5));
    engine.run_until_idle(MAX_TICKS).unwrap();
    assert_eq!(engine.focus(), Some(ChunkCoordinate::new(-1, 0, 0)));

    let records = presentation.snapshot();
    for renderer in engine.renderers() {
        let coordinate = renderer.chunk().unwrap();
        let record = &records[renderer.id()];
        assert_eq!(record.name, format!("Chunk - {}", renderer.id()));
        assert_eq!(record.position, Some(coordinate.world_origin(engine.settings())));
        assert_eq!(record.scale, 0.5);
        assert!(record.material.is_some());
    }
}
