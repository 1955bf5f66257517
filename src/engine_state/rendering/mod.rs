//! Rendering system for the voxel engine.
//!
//! The engine does not draw anything itself. It produces [`MeshBuffers`] per
//! chunk and hands them, together with a material and a transform, to render
//! objects created by a [`Presentation`]. Whatever sits behind those traits
//! (a GPU backend, a scene graph, or the in-memory [`HeadlessPresentation`])
//! owns drawing, bounds and normals recomputation.
//!
//! ## Key Components
//!
//! * `chunk_renderer` - Pooled per-chunk render objects and their state machine
//! * `headless` - A presentation that only records what it was asked to show
//! * `meshing` - Face culling and mesh assembly
//! * `tasks` - Background mesh builds
//! * `vertex` - Interleaved vertex format for byte uploads

use cgmath::Point3;

pub mod chunk_renderer;
pub mod headless;
pub mod meshing;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use chunk_renderer::{ChunkRenderer, RendererState};
pub use headless::{HeadlessPresentation, ObjectRecord};
pub use meshing::MeshBuffers;
pub use vertex::Vertex;

/// Opaque handle to a backend material.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// A displayable object owned by the presentation layer.
pub trait RenderObject {
    /// Replaces the object's geometry.
    fn set_mesh(&mut self, mesh: &MeshBuffers);

    /// Sets the material used to draw the geometry.
    fn set_material(&mut self, material: MaterialHandle);

    /// Places the object in world space with a uniform scale.
    fn set_transform(&mut self, position: Point3<f32>, scale: f32);

    /// Shows or hides the object.
    fn set_visible(&mut self, visible: bool);
}

/// Creates render objects and supplies materials.
pub trait Presentation {
    /// Creates a new, hidden render object.
    fn create_object(&mut self, name: &str) -> Box<dyn RenderObject>;

    /// The material chunk meshes are drawn with.
    fn default_material(&self) -> MaterialHandle;
}
