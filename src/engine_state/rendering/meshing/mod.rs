//! Mesh generation for voxel chunks.
//!
//! This module turns a chunk's solidity grid into flat-shaded cube geometry:
//! one quad per voxel face that borders empty space, including faces on the
//! chunk boundary whose neighbour chunk is not resident.
//!
//! # Architecture
//! - `face`: the fixed per-direction quad tables
//! - `mesher`: the culling and assembly passes ([`build_mesh`])
//! - [`MeshBuffers`]: the assembled, backend-agnostic output
//!
//! # Vertex Budget
//! Meshes are indexed with `u16`, so a chunk may emit at most
//! [`MAX_VERTICES_PER_CHUNK`] vertices. Settings validation rejects chunk
//! sides whose worst case exceeds it, and [`check_vertex_budget`] enforces it
//! again on every build. Exactly 65,000 vertices is accepted.
//!
//! # Performance Considerations
//! - Faces are never welded; each quad owns its four vertices
//! - The per-voxel culling pass can be split across threads on z-slabs
//! - Output slots are addressed by a prefix sum, so emission needs no locking

use crate::engine_state::error::MeshError;
use crate::engine_state::voxels::coordinates::ChunkCoordinate;

mod face;
mod mesher;

pub use face::{Quad, QUAD_TRIANGLES, QUAD_UVS, VERTICES_PER_QUAD};
pub use mesher::build_mesh;

use super::vertex::Vertex;

/// Most vertices a single chunk mesh may contain.
pub const MAX_VERTICES_PER_CHUNK: usize = 65_000;

/// Fails if `vertices` does not fit the per-chunk budget.
///
/// # Errors
/// Returns [`MeshError::VertexBudgetExceeded`] for anything above
/// [`MAX_VERTICES_PER_CHUNK`].
pub fn check_vertex_budget(coordinate: ChunkCoordinate, vertices: usize) -> Result<(), MeshError> {
    if vertices > MAX_VERTICES_PER_CHUNK {
        return Err(MeshError::VertexBudgetExceeded {
            coordinate,
            vertices,
            budget: MAX_VERTICES_PER_CHUNK,
        });
    }
    Ok(())
}

/// The renderable geometry of one chunk.
///
/// `vertices`, `normals` and `uvs` are parallel arrays with four entries per
/// quad. `triangle_indices` holds six entries per quad.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertex positions in chunk-local space
    pub vertices: Vec<[f32; 3]>,
    /// Per-vertex normals
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex texture coordinates
    pub uvs: Vec<[f32; 2]>,
    /// Two triangles per quad, offset by `4 × quadIndex`
    pub triangle_indices: Vec<u16>,
}

impl MeshBuffers {
    /// Concatenates quads into buffers.
    ///
    /// Callers must have checked the vertex budget; indices are truncated to
    /// `u16`.
    pub fn from_quads(quads: &[Quad]) -> Self {
        let vertex_count = quads.len() * VERTICES_PER_QUAD;
        let mut mesh = MeshBuffers {
            vertices: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            uvs: Vec::with_capacity(vertex_count),
            triangle_indices: Vec::with_capacity(quads.len() * QUAD_TRIANGLES.len()),
        };

        for (quad_index, quad) in quads.iter().enumerate() {
            let normal: [f32; 3] = quad.normal().into();
            let base = (quad_index * VERTICES_PER_QUAD) as u16;

            for (corner, uv) in quad.corners.iter().zip(QUAD_UVS) {
                mesh.vertices.push([corner.x, corner.y, corner.z]);
                mesh.normals.push(normal);
                mesh.uvs.push(uv);
            }
            mesh.triangle_indices
                .extend(QUAD_TRIANGLES.iter().map(|local| base + local));
        }

        mesh
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of quads.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    /// Whether the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw bytes of the position array.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes of the normal array.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Raw bytes of the UV array.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw bytes of the index array.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangle_indices)
    }

    /// Positions, normals and UVs zipped into a single vertex stream.
    pub fn interleaved(&self) -> Vec<Vertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((position, normal), uv)| Vertex {
                position: *position,
                normal: *normal,
                uv: *uv,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::face_direction::FaceDirection;
    use cgmath::Point3;

    #[test]
    fn budget_edges() {
        let coordinate = ChunkCoordinate::new(0, 0, 0);
        assert!(check_vertex_budget(coordinate, 0).is_ok());
        assert!(check_vertex_budget(coordinate, 65_000).is_ok());
        assert_eq!(
            check_vertex_budget(coordinate, 65_001),
            Err(MeshError::VertexBudgetExceeded {
                coordinate,
                vertices: 65_001,
                budget: 65_000,
            })
        );
    }

    #[test]
    fn indices_are_offset_per_quad() {
        let quads = [
            Quad::new(Point3::new(0, 0, 0), FaceDirection::UP),
            Quad::new(Point3::new(0, 0, 0), FaceDirection::DOWN),
            Quad::new(Point3::new(1, 0, 0), FaceDirection::UP),
        ];
        let mesh = MeshBuffers::from_quads(&quads);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.quad_count(), 3);
        assert_eq!(mesh.triangle_indices.len(), 18);
        assert_eq!(&mesh.triangle_indices[..6], &[3, 1, 0, 3, 2, 1]);
        assert_eq!(&mesh.triangle_indices[12..], &[11, 9, 8, 11, 10, 9]);
        assert_eq!(mesh.normals[4], [0.0, -1.0, 0.0]);
    }

    #[test]
    fn byte_views_match_element_sizes() {
        let mesh = MeshBuffers::from_quads(&[Quad::new(Point3::new(2, 2, 2), FaceDirection::LEFT)]);
        assert_eq!(mesh.vertex_bytes().len(), 4 * 12);
        assert_eq!(mesh.normal_bytes().len(), 4 * 12);
        assert_eq!(mesh.uv_bytes().len(), 4 * 8);
        assert_eq!(mesh.index_bytes().len(), 6 * 2);
        let interleaved = mesh.interleaved();
        assert_eq!(interleaved.len(), 4);
        assert_eq!(interleaved[0].position, mesh.vertices[0]);
    }

    #[test]
    fn empty_mesh() {
        let mesh = MeshBuffers::from_quads(&[]);
        assert!(mesh.is_empty());
        assert!(mesh.index_bytes().is_empty());
    }
}
