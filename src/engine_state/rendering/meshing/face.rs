//! Quad geometry for a single exposed voxel face.
//!
//! Every voxel is a unit cube centred on its local coordinate. Its eight
//! corners are numbered bottom ring first (`p0..p3`, y = -0.5) and then top
//! ring (`p4..p7`, y = +0.5):
//!
//! ```text
//!        p7 ------ p6
//!       /|        /|        +y
//!     p4 ------ p5 |         |  -z
//!      | p3 -----|-p2        | /
//!      |/        |/          |/
//!     p0 ------ p1           +---- +x
//! ```
//!
//! Each face direction picks four of those corners in a fixed order, and the
//! two triangles of a quad always use the local pattern [`QUAD_TRIANGLES`].

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::{coordinates::VoxelCoordinate, face_direction::FaceDirection};

/// Corners of the unit cube around a voxel centre.
const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, -0.5, -0.5],
    [-0.5, -0.5, -0.5],
    [-0.5, 0.5, 0.5],
    [0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
];

/// Local triangle indices of one quad: two triangles sharing corners 1 and 3.
pub const QUAD_TRIANGLES: [u16; 6] = [3, 1, 0, 3, 2, 1];

/// Texture coordinates of the four quad corners.
pub const QUAD_UVS: [[f32; 2]; 4] = [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Vertices per quad.
pub const VERTICES_PER_QUAD: usize = 4;

/// Cube corner indices used by each face direction, in emission order.
fn corner_indices(direction: FaceDirection) -> [usize; 4] {
    match direction {
        FaceDirection::DOWN => [0, 1, 2, 3],
        FaceDirection::UP => [7, 6, 5, 4],
        FaceDirection::LEFT => [7, 4, 0, 3],
        FaceDirection::RIGHT => [5, 6, 2, 1],
        FaceDirection::FRONT => [4, 5, 1, 0],
        FaceDirection::BACK => [6, 7, 3, 2],
    }
}

/// One exposed face of one voxel, in chunk-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// The four corners in emission order
    pub corners: [Point3<f32>; 4],
    /// Which side of the voxel the quad covers
    pub direction: FaceDirection,
}

impl Quad {
    /// Builds the quad covering the `direction` side of the voxel at `local`.
    pub fn new(local: VoxelCoordinate, direction: FaceDirection) -> Self {
        let centre = Vector3::new(local.x as f32, local.y as f32, local.z as f32);
        let corners = corner_indices(direction).map(|index| {
            let [x, y, z] = CUBE_CORNERS[index];
            Point3::new(x, y, z) + centre
        });
        Quad { corners, direction }
    }

    /// The outward normal shared by all four corners.
    pub fn normal(&self) -> Vector3<f32> {
        self.direction.normal()
    }
}

/// Placeholder for preallocated quad slots before emission fills them.
impl Default for Quad {
    fn default() -> Self {
        Quad {
            corners: [Point3::new(0.0, 0.0, 0.0); 4],
            direction: FaceDirection::UP,
        }
    }
}
