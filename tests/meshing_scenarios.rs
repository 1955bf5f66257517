use cgmath::Point3;
use voxel_streaming_engine::engine_state::{
    error::MeshError,
    rendering::meshing::{build_mesh, check_vertex_budget, MeshBuffers, MAX_VERTICES_PER_CHUNK},
    settings::Settings,
    voxels::{
        chunk::{chunk_creation::VoxelGridBuilder, ChunkData, VoxelGrid},
        coordinates::ChunkCoordinate,
        height_field::{ConstantHeightField, PerlinHeightField},
        registry::ChunkRegistry,
    },
};

/// Fills and inserts the chunks at `coordinates` from `height`.
fn flat_world(settings: &Settings, height: f32, coordinates: &[ChunkCoordinate]) -> ChunkRegistry {
    let field = ConstantHeightField(height);
    let mut registry = ChunkRegistry::new();
    for &coordinate in coordinates {
        let generation = registry.next_generation();
        registry
            .insert(ChunkData::generate(coordinate, settings, &field, generation))
            .unwrap();
    }
    registry
}

fn with_neighbors(center: ChunkCoordinate) -> Vec<ChunkCoordinate> {
    let mut coordinates = vec![center];
    coordinates.extend(center.neighbors());
    coordinates
}

fn mesh_of(registry: &ChunkRegistry, coordinate: ChunkCoordinate) -> MeshBuffers {
    build_mesh(registry.lookup(coordinate).unwrap(), registry, 1).unwrap()
}

#[test]
fn fully_surrounded_solid_chunk_emits_nothing() {
    // Height 0.5 puts the surface at world y = 32, so chunk y = 0 and its six
    // neighbours (y from -1 to 1) are solid throughout.
    let settings = Settings::default();
    let center = ChunkCoordinate::new(0, 0, 0);
    let registry = flat_world(&settings, 0.5, &with_neighbors(center));

    assert_eq!(registry.lookup(center).unwrap().voxels().solid_count(), 16 * 16 * 16);
    assert!(mesh_of(&registry, center).is_empty());
}

#[test]
fn exposed_top_chunk_emits_a_flat_top() {
    // Chunk y = 2 starts at world y = 32: only its bottom layer is solid.
    let settings = Settings::default();
    let top = ChunkCoordinate::new(0, 2, 0);
    let registry = flat_world(&settings, 0.5, &with_neighbors(top));

    let mesh = mesh_of(&registry, top);
    assert_eq!(mesh.quad_count(), 16 * 16);
    assert_eq!(mesh.vertex_count(), 1024);
    assert!(mesh.normals.iter().all(|normal| *normal == [0.0, 1.0, 0.0]));
    assert!(mesh.vertices.iter().all(|vertex| vertex[1] == 0.5));
    assert_eq!(mesh.triangle_indices.len(), 256 * 6);
    assert_eq!(mesh.triangle_indices.iter().copied().max(), Some(1023));
}

#[test]
fn missing_neighbors_expose_boundary_faces() {
    // Same chunk with nothing around it: the solid layer's four sides and its
    // underside are drawn too.
    let settings = Settings::default();
    let top = ChunkCoordinate::new(0, 2, 0);
    let registry = flat_world(&settings, 0.5, &[top]);

    let mesh = mesh_of(&registry, top);
    assert_eq!(mesh.quad_count(), 256 + 256 + 4 * 16);
}

#[test]
fn single_voxel_is_a_cube() {
    let coordinate = ChunkCoordinate::new(3, -1, 7);
    let mut builder = VoxelGridBuilder::new(3);
    for i in 0..27 {
        builder.push(i == 13);
    }
    let mut registry = ChunkRegistry::new();
    registry
        .insert(ChunkData::from_grid(coordinate, builder.finish(), 1))
        .unwrap();

    let mesh = mesh_of(&registry, coordinate);
    assert_eq!(mesh.quad_count(), 6);
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.triangle_indices.len(), 36);
    for vertex in &mesh.vertices {
        for axis in vertex {
            assert!(*axis == 0.5 || *axis == 1.5);
        }
    }
}

#[test]
fn neighbor_chunk_hides_the_shared_boundary() {
    let side = 4;
    let left = ChunkCoordinate::new(0, 0, 0);
    let right = ChunkCoordinate::new(1, 0, 0);
    let mut registry = ChunkRegistry::new();
    registry
        .insert(ChunkData::from_grid(left, VoxelGrid::uniform(side, true), 1))
        .unwrap();
    let alone = mesh_of(&registry, left).quad_count();

    registry
        .insert(ChunkData::from_grid(right, VoxelGrid::uniform(side, true), 2))
        .unwrap();
    let joined = mesh_of(&registry, left).quad_count();

    assert_eq!(alone - joined, side * side);
    assert!(registry.is_solid(registry.lookup(right).unwrap(), Point3::new(-1, 0, 0)));
}

#[test]
fn fanned_out_builds_match_serial_builds_on_noise_terrain() {
    let settings = Settings {
        max_height_in_chunks: 1,
        ..Settings::default()
    };
    let field = PerlinHeightField::new(&settings);
    let center = ChunkCoordinate::new(0, 0, 0);
    let mut registry = ChunkRegistry::new();
    for coordinate in with_neighbors(center) {
        let generation = registry.next_generation();
        registry
            .insert(ChunkData::generate(coordinate, &settings, &field, generation))
            .unwrap();
    }

    let chunk = registry.lookup(center).unwrap();
    let serial = build_mesh(chunk, &registry, 1).unwrap();
    assert!(!serial.is_empty());
    for fanout in [2, 4, 7, 16] {
        assert_eq!(build_mesh(chunk, &registry, fanout).unwrap(), serial);
    }
}

#[test]
fn vertex_budget_is_inclusive() {
    let coordinate = ChunkCoordinate::new(0, 0, 0);
    assert_eq!(MAX_VERTICES_PER_CHUNK, 65_000);
    assert!(check_vertex_budget(coordinate, 65_000).is_ok());
    assert!(matches!(
        check_vertex_budget(coordinate, 65_001),
        Err(MeshError::VertexBudgetExceeded { vertices: 65_001, .. })
    ));
}

#[test]
fn largest_valid_side_stays_within_budget() {
    // A 3D checkerboard is the worst case for face culling.
    let side = 17;
    let settings = Settings {
        voxels_per_chunk_side: side,
        ..Settings::default()
    };
    assert!(settings.validate().is_ok());

    let n = side as usize;
    let mut builder = VoxelGridBuilder::new(n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                builder.push((x + y + z) % 2 == 0);
            }
        }
    }
    let coordinate = ChunkCoordinate::new(0, 0, 0);
    let mut registry = ChunkRegistry::new();
    registry
        .insert(ChunkData::from_grid(coordinate, builder.finish(), 1))
        .unwrap();

    let mesh = mesh_of(&registry, coordinate);
    assert!(mesh.vertex_count() <= MAX_VERTICES_PER_CHUNK);
    assert!(mesh.vertex_count() as u64 <= Settings::worst_case_vertices(side));
}
