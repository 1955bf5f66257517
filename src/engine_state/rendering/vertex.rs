//! Interleaved vertex format for handing chunk meshes to a backend.
//!
//! [`MeshBuffers`](super::meshing::MeshBuffers) keeps positions, normals and
//! UVs in separate arrays, which is what the render object interface takes.
//! Backends that want a single vertex stream can interleave them into
//! [`Vertex`] and upload the result as raw bytes.

use bytemuck::{Pod, Zeroable};

/// A single mesh vertex.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in chunk-local space
    pub position: [f32; 3],
    /// Outward face normal
    pub normal: [f32; 3],
    /// Texture coordinates (normalized 0.0-1.0)
    pub uv: [f32; 2],
}

impl Vertex {
    /// Size of one vertex in bytes.
    pub const SIZE: usize = std::mem::size_of::<Vertex>();
}
