//! # Face Direction Module
//!
//! The six axis-aligned faces of a voxel cube and their fixed direction vectors.

use cgmath::Vector3;

/// One face of a voxel cube.
///
/// Directions follow a Y-up convention: FRONT faces +Z, RIGHT faces +X,
/// UP faces +Y.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum FaceDirection {
    /// The top face (facing positive Y)
    UP = 0,

    /// The bottom face (facing negative Y)
    DOWN = 1,

    /// The left face (facing negative X)
    LEFT = 2,

    /// The right face (facing positive X)
    RIGHT = 3,

    /// The front face (facing positive Z)
    FRONT = 4,

    /// The back face (facing negative Z)
    BACK = 5,
}

impl FaceDirection {
    /// All six faces in emission order: [UP, DOWN, LEFT, RIGHT, FRONT, BACK]
    pub fn all() -> [FaceDirection; 6] {
        [
            FaceDirection::UP,
            FaceDirection::DOWN,
            FaceDirection::LEFT,
            FaceDirection::RIGHT,
            FaceDirection::FRONT,
            FaceDirection::BACK,
        ]
    }

    /// Step from a voxel to the neighbour this face touches.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            FaceDirection::UP => Vector3::new(0, 1, 0),
            FaceDirection::DOWN => Vector3::new(0, -1, 0),
            FaceDirection::LEFT => Vector3::new(-1, 0, 0),
            FaceDirection::RIGHT => Vector3::new(1, 0, 0),
            FaceDirection::FRONT => Vector3::new(0, 0, 1),
            FaceDirection::BACK => Vector3::new(0, 0, -1),
        }
    }

    /// Outward unit normal of the face.
    pub fn normal(self) -> Vector3<f32> {
        self.offset().cast::<f32>().unwrap_or(Vector3::new(0.0, 0.0, 0.0))
    }

    /// This face's bit in a per-voxel exposed-face mask.
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }
}
